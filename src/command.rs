//! Host commands.
//!
//! A host (UI, script, test) drives the world through these commands between
//! ticks. Textual commands use a small line grammar:
//!
//! ```text
//! prey <delta>          signed population delta, e.g. "prey 10", "prey -3"
//! prey add | prey remove
//! predator on | off
//! eating on | off
//! obstacle add <x> <y>
//! obstacle remove <x> <y>
//! obstacle clear
//! ```

use flocking_common::Vec2;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    AddPrey,
    RemovePrey,
    ApplyPreyDelta(i64),
    SetPredatorEnabled(bool),
    SetEatingEnabled(bool),
    AddObstacle(Vec2),
    RemoveObstacleNear(Vec2),
    ClearObstacles,
}

/// Rejected host input. The world is never modified by a command that fails
/// to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Blank input.
    Empty,
    /// The leading keyword or sub-command is not recognized.
    Unknown(String),
    /// A population delta that is not an integer, or that would grow the
    /// population past its limit.
    InvalidDelta(String),
    /// Wrong argument count or a malformed argument.
    InvalidArgument(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "Empty command"),
            CommandError::Unknown(word) => write!(f, "Unknown command '{}'", word),
            CommandError::InvalidDelta(text) => {
                write!(f, "Population delta '{}' is not a usable integer", text)
            }
            CommandError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for CommandError {}

/// Parses the text a host would type into a population box, e.g. "10" or "-5".
pub fn parse_population_delta(text: &str) -> Result<i64, CommandError> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidDelta(trimmed.to_string()))
}

fn parse_toggle(word: Option<&str>) -> Result<bool, CommandError> {
    match word {
        Some("on") | Some("true") | Some("enable") => Ok(true),
        Some("off") | Some("false") | Some("disable") => Ok(false),
        Some(other) => Err(CommandError::InvalidArgument(format!(
            "expected on/off, got '{}'",
            other
        ))),
        None => Err(CommandError::InvalidArgument("expected on/off".to_string())),
    }
}

fn parse_point(args: &[&str]) -> Result<Vec2, CommandError> {
    let &[x, y] = args else {
        return Err(CommandError::InvalidArgument(format!(
            "expected <x> <y>, got {} value(s)",
            args.len()
        )));
    };
    let coord = |s: &str| {
        s.parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CommandError::InvalidArgument(format!("'{}' is not a coordinate", s)))
    };
    Ok(Vec2::new(coord(x)?, coord(y)?))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = words.split_first() else {
            return Err(CommandError::Empty);
        };

        match head.to_ascii_lowercase().as_str() {
            "prey" => match rest {
                ["add"] => Ok(Command::AddPrey),
                ["remove"] => Ok(Command::RemovePrey),
                [delta] => parse_population_delta(delta).map(Command::ApplyPreyDelta),
                _ => Err(CommandError::InvalidArgument(
                    "prey expects 'add', 'remove' or a signed count".to_string(),
                )),
            },
            "predator" => parse_toggle(rest.first().copied()).map(Command::SetPredatorEnabled),
            "eating" => parse_toggle(rest.first().copied()).map(Command::SetEatingEnabled),
            "obstacle" => match rest.split_first() {
                Some((&"add", args)) => parse_point(args).map(Command::AddObstacle),
                Some((&"remove", args)) => parse_point(args).map(Command::RemoveObstacleNear),
                Some((&"clear", [])) => Ok(Command::ClearObstacles),
                Some((other, _)) => Err(CommandError::Unknown(format!("obstacle {}", other))),
                None => Err(CommandError::InvalidArgument(
                    "obstacle expects add, remove or clear".to_string(),
                )),
            },
            _ => Err(CommandError::Unknown(head.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_population_commands() {
        assert_eq!("prey add".parse::<Command>(), Ok(Command::AddPrey));
        assert_eq!("prey remove".parse::<Command>(), Ok(Command::RemovePrey));
        assert_eq!("prey -5".parse::<Command>(), Ok(Command::ApplyPreyDelta(-5)));
        assert_eq!("  prey +12 ".parse::<Command>(), Ok(Command::ApplyPreyDelta(12)));
    }

    #[test]
    fn rejects_non_numeric_delta() {
        assert_eq!(
            "prey ten".parse::<Command>(),
            Err(CommandError::InvalidDelta("ten".to_string()))
        );
        assert_eq!(parse_population_delta(" 7 "), Ok(7));
        assert!(parse_population_delta("-").is_err());
        assert!(parse_population_delta("").is_err());
    }

    #[test]
    fn parses_toggles_and_obstacles() {
        assert_eq!("predator on".parse::<Command>(), Ok(Command::SetPredatorEnabled(true)));
        assert_eq!("Eating off".parse::<Command>(), Ok(Command::SetEatingEnabled(false)));
        assert_eq!(
            "obstacle add 100 250.5".parse::<Command>(),
            Ok(Command::AddObstacle(Vec2::new(100.0, 250.5)))
        );
        assert_eq!(
            "obstacle remove 1 2".parse::<Command>(),
            Ok(Command::RemoveObstacleNear(Vec2::new(1.0, 2.0)))
        );
        assert_eq!("obstacle clear".parse::<Command>(), Ok(Command::ClearObstacles));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert!(matches!("fly away".parse::<Command>(), Err(CommandError::Unknown(_))));
        for line in ["predator maybe", "obstacle add 1", "obstacle add 1 NaN"] {
            assert!(
                matches!(line.parse::<Command>(), Err(CommandError::InvalidArgument(_))),
                "{}",
                line
            );
        }
    }
}
