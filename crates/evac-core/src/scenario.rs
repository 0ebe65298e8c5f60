//! Scenario file parser: danger cells + agent descriptors.
//!
//! Format (two lines):
//! ```text
//! <danger cell ids, whitespace separated>
//! <agent descriptors, whitespace separated>
//! ```
//! Each agent descriptor matches `(\d+)(.)(\d+)?`, where the middle
//! character selects the agent type (`r`/`f`/`s`/`p`) and the trailing
//! number is a goal cell id, required only for `s` (static) agents.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid danger cell id on line 1: {0}")]
    InvalidDangerCell(String),

    #[error("malformed agent descriptor: {0}")]
    MalformedAgent(String),

    #[error("unknown agent type character: {0}")]
    UnknownAgentType(char),

    #[error("static agent descriptor missing required goal cell: {0}")]
    MissingGoal(String),
}

/// The type of evacuation strategy an agent is dispatched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Retargeting,
    ClosestFrontier,
    /// Carries a fixed, pre-specified goal cell.
    Static,
    Panicked,
}

impl AgentKind {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            'r' => Some(Self::Retargeting),
            'f' => Some(Self::ClosestFrontier),
            's' => Some(Self::Static),
            'p' => Some(Self::Panicked),
            _ => None,
        }
    }
}

/// A single scenario agent descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub kind: AgentKind,
    pub origin: u32,
    /// Present only for `Static` agents.
    pub goal: Option<u32>,
}

/// A parsed scenario file.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub danger: Vec<u32>,
    pub agents: Vec<AgentSpec>,
}

impl Scenario {
    pub fn parse(input: &str) -> Result<Self, ScenarioError> {
        let mut lines = input.lines();

        let danger_line = lines.next().unwrap_or("").trim();
        let danger = if danger_line.is_empty() {
            Vec::new()
        } else {
            danger_line
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<u32>()
                        .map_err(|_| ScenarioError::InvalidDangerCell(tok.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let agents_line = lines.next().unwrap_or("").trim();
        let agents = if agents_line.is_empty() {
            Vec::new()
        } else {
            agents_line
                .split_whitespace()
                .map(parse_agent_descriptor)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self { danger, agents })
    }
}

/// Parse a single `(\d+)(.)(\d+)?` descriptor by hand (no regex dependency
/// needed for a pattern this small).
fn parse_agent_descriptor(desc: &str) -> Result<AgentSpec, ScenarioError> {
    let chars: Vec<char> = desc.chars().collect();
    let mut i = 0;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 || i >= chars.len() {
        return Err(ScenarioError::MalformedAgent(desc.to_string()));
    }
    let origin: u32 = chars[..i]
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| ScenarioError::MalformedAgent(desc.to_string()))?;

    let type_char = chars[i];
    let kind = AgentKind::from_char(type_char).ok_or(ScenarioError::UnknownAgentType(type_char))?;
    i += 1;

    let goal = if i < chars.len() {
        let rest: String = chars[i..].iter().collect();
        Some(
            rest.parse::<u32>()
                .map_err(|_| ScenarioError::MalformedAgent(desc.to_string()))?,
        )
    } else {
        None
    };

    if kind == AgentKind::Static && goal.is_none() {
        return Err(ScenarioError::MissingGoal(desc.to_string()));
    }

    Ok(AgentSpec { kind, origin, goal })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_danger_and_agents() {
        let scn = Scenario::parse("0 1 2 3\n12r 5f 9s15 3p\n").unwrap();
        assert_eq!(scn.danger, vec![0, 1, 2, 3]);
        assert_eq!(scn.agents.len(), 4);
        assert_eq!(scn.agents[0], AgentSpec { kind: AgentKind::Retargeting, origin: 12, goal: None });
        assert_eq!(scn.agents[1], AgentSpec { kind: AgentKind::ClosestFrontier, origin: 5, goal: None });
        assert_eq!(scn.agents[2], AgentSpec { kind: AgentKind::Static, origin: 9, goal: Some(15) });
        assert_eq!(scn.agents[3], AgentSpec { kind: AgentKind::Panicked, origin: 3, goal: None });
    }

    #[test]
    fn empty_danger_line_is_allowed() {
        let scn = Scenario::parse("\n12r\n").unwrap();
        assert!(scn.danger.is_empty());
        assert_eq!(scn.agents.len(), 1);
    }

    #[test]
    fn static_agent_without_goal_is_an_error() {
        assert!(matches!(
            parse_agent_descriptor("9s"),
            Err(ScenarioError::MissingGoal(_))
        ));
    }

    #[test]
    fn unknown_type_character_is_an_error() {
        assert!(matches!(
            parse_agent_descriptor("9z"),
            Err(ScenarioError::UnknownAgentType('z'))
        ));
    }
}
