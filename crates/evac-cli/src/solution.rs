//! Solution file I/O: one agent per line, space-separated
//! cell ids, each formatted with width 2 and leading zeros, all lines
//! equal length. Stdout-compatible.

use evac_core::Cell;

/// Render `paths` in the solution-file format.
pub fn format_paths(paths: &[Vec<Cell>]) -> String {
    paths
        .iter()
        .map(|path| {
            path.iter()
                .map(|c| format!("{c:02}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a solution file back into per-agent cell sequences. Width-2
/// zero-padding is a display convention, not a field-width constraint on
/// the reader: any whitespace-separated run of digits is accepted.
pub fn parse_solution(input: &str) -> Result<Vec<Vec<Cell>>, std::num::ParseIntError> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().map(str::parse).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_width_2_zero_padding() {
        let paths = vec![vec![0, 1, 12], vec![3, 4, 5]];
        let out = format_paths(&paths);
        assert_eq!(out, "00 01 12\n03 04 05");
    }

    #[test]
    fn round_trips_through_parse() {
        let paths = vec![vec![0, 1, 12], vec![3, 4, 5]];
        let out = format_paths(&paths);
        assert_eq!(parse_solution(&out).unwrap(), paths);
    }

    #[test]
    fn three_digit_cells_are_not_truncated() {
        let paths = vec![vec![123, 4]];
        let out = format_paths(&paths);
        assert_eq!(out, "123 04");
    }
}
