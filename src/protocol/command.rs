//! Command definitions
//!
//! Represents commands from the command processor, parsed from an ordered
//! argument vector.

use std::fmt;

use crate::error::{DsError, Result};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    MGet,
    Set,
    MSet,
    Del,
}

impl CommandType {
    /// Match a command name, ignoring ASCII case
    pub fn from_name(name: &[u8]) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        match upper.as_slice() {
            b"GET" => Some(CommandType::Get),
            b"MGET" => Some(CommandType::MGet),
            b"SET" => Some(CommandType::Set),
            b"MSET" => Some(CommandType::MSet),
            b"DEL" => Some(CommandType::Del),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandType::Get => "GET",
            CommandType::MGet => "MGET",
            CommandType::Set => "SET",
            CommandType::MSet => "MSET",
            CommandType::Del => "DEL",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: Vec<u8> },

    /// Get several values, aggregated into one reply
    MGet { keys: Vec<Vec<u8>> },

    /// Set a key-value pair
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Set several pairs atomically. Holds the raw interleaved arguments;
    /// pairing is checked when the command runs.
    MSet { args: Vec<Vec<u8>> },

    /// Delete one or more keys
    Del { keys: Vec<Vec<u8>> },
}

impl Command {
    /// Parse a full argument vector. Argument 0 is the command name.
    pub fn parse<A: AsRef<[u8]>>(argv: &[A]) -> Result<Self> {
        let (name, args) = argv
            .split_first()
            .ok_or_else(|| DsError::Protocol("empty command".to_string()))?;

        let command_type = CommandType::from_name(name.as_ref()).ok_or_else(|| {
            DsError::Protocol(format!(
                "unknown command '{}'",
                String::from_utf8_lossy(name.as_ref())
            ))
        })?;

        let owned = |args: &[A]| -> Vec<Vec<u8>> { args.iter().map(|a| a.as_ref().to_vec()).collect() };

        match (command_type, args) {
            (CommandType::Get, [key]) => Ok(Command::Get {
                key: key.as_ref().to_vec(),
            }),
            (CommandType::Set, [key, value]) => Ok(Command::Set {
                key: key.as_ref().to_vec(),
                value: value.as_ref().to_vec(),
            }),
            (CommandType::MGet, keys) if !keys.is_empty() => Ok(Command::MGet { keys: owned(keys) }),
            (CommandType::Del, keys) if !keys.is_empty() => Ok(Command::Del { keys: owned(keys) }),
            (CommandType::MSet, args) => Ok(Command::MSet { args: owned(args) }),
            (command_type, _) => Err(DsError::Protocol(format!(
                "wrong number of arguments for '{}' command",
                command_type
            ))),
        }
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::MGet { .. } => CommandType::MGet,
            Command::Set { .. } => CommandType::Set,
            Command::MSet { .. } => CommandType::MSet,
            Command::Del { .. } => CommandType::Del,
        }
    }
}
