//! Protocol Module
//!
//! Command and reply values exchanged with the surrounding command
//! processor. Framing and transport belong to the embedder; this module only
//! defines what a command means and what a reply carries.
//!
//! ### Commands (argument 0 is the command name)
//! - GET  key
//! - MGET key [key ...]
//! - SET  key value
//! - MSET key value [key value ...]
//! - DEL  key [key ...]
//!
//! ### Replies
//! - Bulk: raw value, or an aggregated multi-get reply (see [`codec`])
//! - Nil: nothing found, or a malformed MSET
//! - Ok: write or delete applied
//! - Error: engine failure text

mod command;
mod reply;
pub mod codec;

pub use command::{Command, CommandType};
pub use reply::Reply;
pub use codec::{encode, encode_into, encoded_len_bound, Aggregator};
