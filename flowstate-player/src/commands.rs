//! Terminal host commands
//!
//! One command per input line, case-insensitive:
//! `start`, `pause`, `resume`, `reset`, `seek <seconds>`, `status`,
//! `preview <cue-id>`, `quit`/`exit`.

use crate::error::{Error, Result};
use std::str::FromStr;

/// A parsed host command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    Seek { offset_ms: u64 },
    Status,
    Preview { cue_id: String },
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(Error::InvalidCommand("empty command".to_string()));
        };
        let argument = words.next();
        if words.next().is_some() {
            return Err(Error::InvalidCommand(format!("too many arguments: {}", line.trim())));
        }

        let command = match (verb.to_ascii_lowercase().as_str(), argument) {
            ("start", None) => Command::Start,
            ("pause", None) => Command::Pause,
            ("resume", None) => Command::Resume,
            ("reset", None) => Command::Reset,
            ("status", None) => Command::Status,
            ("quit" | "exit", None) => Command::Quit,
            ("seek", Some(seconds)) => Command::Seek {
                offset_ms: parse_seconds(seconds)?,
            },
            ("preview", Some(cue_id)) => Command::Preview {
                cue_id: cue_id.to_string(),
            },
            ("seek", None) => {
                return Err(Error::InvalidCommand("usage: seek <seconds>".to_string()))
            }
            ("preview", None) => {
                return Err(Error::InvalidCommand("usage: preview <cue-id>".to_string()))
            }
            (_, _) => {
                return Err(Error::InvalidCommand(format!("unknown command: {}", line.trim())))
            }
        };
        Ok(command)
    }
}

fn parse_seconds(text: &str) -> Result<u64> {
    let seconds: f64 = text
        .parse()
        .map_err(|_| Error::InvalidCommand(format!("not a number of seconds: {}", text)))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(Error::InvalidCommand(format!(
            "seek position must be zero or more seconds, got {}",
            text
        )));
    }
    Ok((seconds * 1000.0).round() as u64)
}
