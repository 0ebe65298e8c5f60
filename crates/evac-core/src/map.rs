//! MovingAI-style `.map` format parser.

use thiserror::Error;

/// A single cell in a raw tile map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Agent can traverse this cell.
    Passable,
    /// Obstacle; agent cannot enter.
    Blocked,
}

/// Errors from parsing a map file.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("missing header field: {0}")]
    MissingHeader(&'static str),

    #[error("invalid header value for {field}: {value}")]
    InvalidHeader { field: &'static str, value: String },

    #[error("invalid map type: {0}")]
    InvalidMapType(String),

    #[error("dimension mismatch: expected {expected} rows, got {got}")]
    DimensionMismatch { expected: u32, got: u32 },

    #[error("row {row} width mismatch: expected {expected}, got {got}")]
    RowWidthMismatch { row: u32, expected: u32, got: u32 },
}

/// A parsed raw tile map.
#[derive(Debug, Clone)]
pub struct TileMap {
    width: u32,
    height: u32,
    /// Row-major; index = row * width + col
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Parse a map file:
    /// ```text
    /// type octile
    /// height N
    /// width M
    /// map
    /// <N lines of M characters, '@' = wall, anything else = walkable>
    /// ```
    pub fn parse(input: &str) -> Result<Self, MapError> {
        let mut lines = input.lines();

        let mut map_type: Option<String> = None;
        let mut height: Option<u32> = None;
        let mut width: Option<u32> = None;

        for line in lines.by_ref() {
            let line = line.trim();
            if line.eq_ignore_ascii_case("map") {
                break;
            }
            if let Some(rest) = line.strip_prefix("type ") {
                map_type = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("height ") {
                height = Some(rest.trim().parse().map_err(|_| MapError::InvalidHeader {
                    field: "height",
                    value: rest.to_string(),
                })?);
            } else if let Some(rest) = line.strip_prefix("width ") {
                width = Some(rest.trim().parse().map_err(|_| MapError::InvalidHeader {
                    field: "width",
                    value: rest.to_string(),
                })?);
            }
        }

        let map_type = map_type.ok_or(MapError::MissingHeader("type"))?;
        if map_type != "octile" {
            return Err(MapError::InvalidMapType(map_type));
        }
        let height = height.ok_or(MapError::MissingHeader("height"))?;
        let width = width.ok_or(MapError::MissingHeader("width"))?;

        let mut tiles = Vec::with_capacity((width * height) as usize);
        let mut row_count: u32 = 0;

        for line in lines {
            if row_count >= height {
                break;
            }
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != width as usize {
                return Err(MapError::RowWidthMismatch {
                    row: row_count,
                    expected: width,
                    got: chars.len() as u32,
                });
            }
            for ch in chars {
                tiles.push(Self::char_to_tile(ch));
            }
            row_count += 1;
        }

        if row_count < height {
            return Err(MapError::DimensionMismatch {
                expected: height,
                got: row_count,
            });
        }

        Ok(Self { width, height, tiles })
    }

    fn char_to_tile(ch: char) -> Tile {
        match ch {
            '@' => Tile::Blocked,
            _ => Tile::Passable,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, row: u32, col: u32) -> Option<Tile> {
        if row < self.height && col < self.width {
            Some(self.tiles[(row * self.width + col) as usize])
        } else {
            None
        }
    }

    pub fn is_passable(&self, row: u32, col: u32) -> bool {
        self.get(row, col) == Some(Tile::Passable)
    }
}
