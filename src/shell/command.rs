//! Shell Commands
//!
//! Parses one input line into a [`Command`].

use std::str::FromStr;
use std::time::Duration;

use crate::error::CacheError;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// One parsed shell line.
///
/// # Grammar
/// - `PUT key value [ttl_ms]`
/// - `GET key`
/// - `DEL key`
/// - `KEYS`, `SIZE`, `STATS`, `RESET`, `CLEANUP`
///
/// Verbs are case-insensitive; keys and values are single tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Put {
        key: String,
        value: String,
        ttl: Option<Duration>,
    },
    Get {
        key: String,
    },
    Del {
        key: String,
    },
    Keys,
    Size,
    Stats,
    Reset,
    Cleanup,
}

impl FromStr for Command {
    type Err = CacheError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| invalid("empty line"))?
            .to_ascii_uppercase();
        let args: Vec<&str> = tokens.collect();

        let command = match (verb.as_str(), args.as_slice()) {
            ("PUT", [key, value]) => Command::Put {
                key: validate_key(key)?,
                value: value.to_string(),
                ttl: None,
            },
            ("PUT", [key, value, ttl]) => Command::Put {
                key: validate_key(key)?,
                value: value.to_string(),
                ttl: Some(parse_ttl(ttl)?),
            },
            ("GET", [key]) => Command::Get {
                key: validate_key(key)?,
            },
            ("DEL", [key]) => Command::Del {
                key: validate_key(key)?,
            },
            ("KEYS", []) => Command::Keys,
            ("SIZE", []) => Command::Size,
            ("STATS", []) => Command::Stats,
            ("RESET", []) => Command::Reset,
            ("CLEANUP", []) => Command::Cleanup,
            ("PUT" | "GET" | "DEL" | "KEYS" | "SIZE" | "STATS" | "RESET" | "CLEANUP", _) => {
                return Err(invalid(&format!("wrong number of arguments for {verb}")));
            }
            _ => return Err(invalid(&format!("unknown command {verb}"))),
        };
        Ok(command)
    }
}

fn invalid(msg: &str) -> CacheError {
    CacheError::InvalidCommand(msg.to_string())
}

fn validate_key(key: &str) -> Result<String, CacheError> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(invalid(&format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(key.to_string())
}

fn parse_ttl(raw: &str) -> Result<Duration, CacheError> {
    raw.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| invalid(&format!("ttl must be a whole number of milliseconds, got {raw}")))
}
