//! Reply definitions
//!
//! Represents replies handed back to the command processor.

use std::fmt;

use bytes::Bytes;

/// A reply to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Raw bulk payload
    Bulk(Bytes),

    /// Absent value sentinel
    Nil,

    /// Success sentinel
    Ok,

    /// Error carrying the failure text
    Error(String),
}

impl Reply {
    /// Create a bulk reply from a value
    pub fn bulk(payload: impl Into<Bytes>) -> Self {
        Reply::Bulk(payload.into())
    }

    /// Create an error reply
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Payload of a bulk reply
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Reply::Bulk(bytes) => Some(&bytes[..]),
            _ => None,
        }
    }
}

/// Renders replies the way an interactive client shows them
impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Bulk(bytes) => {
                f.write_str("\"")?;
                for &byte in bytes.iter() {
                    write!(f, "{}", std::ascii::escape_default(byte))?;
                }
                f.write_str("\"")
            }
            Reply::Nil => f.write_str("(nil)"),
            Reply::Ok => f.write_str("OK"),
            Reply::Error(message) => write!(f, "(error) {}", message),
        }
    }
}
