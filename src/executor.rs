//! Batch command executor
//!
//! Turns point and multi-key commands into engine calls.
//!
//! ## Contracts
//! - `point_get`: absent key → `Ok(None)`; engine failure → `Err`. A stored
//!   empty value is present and comes back as `Some(vec![])`.
//! - `multi_get`: reads keys in order, stops at the first engine error and
//!   discards what was gathered; absent and empty values are left out of the
//!   aggregated reply; nothing gathered → `Ok(None)`.
//! - `multi_set`: interleaved key/value arguments, committed as one batch.
//!   An empty or odd argument list is malformed and never reaches the engine.
//! - `delete`: one key → point delete; several → one atomic batch.
//!
//! Every per-call object comes from the context as a scoped guard, so it is
//! released on whichever path the method returns by.

use bytes::Bytes;

use crate::context::Context;
use crate::engine::StorageEngine;
use crate::error::{DsError, Result};
use crate::protocol::codec::Aggregator;
use crate::protocol::{Command, Reply};

/// Executes commands against a context's engine
pub struct BatchExecutor<'a, E: StorageEngine> {
    ctx: &'a Context<E>,
}

impl<'a, E: StorageEngine> BatchExecutor<'a, E> {
    pub fn new(ctx: &'a Context<E>) -> Self {
        Self { ctx }
    }

    /// Parse an argument vector and execute it
    pub fn dispatch<A: AsRef<[u8]>>(&self, argv: &[A]) -> Reply {
        match Command::parse(argv) {
            Ok(command) => self.execute(command),
            Err(e) => Reply::error(e.to_string()),
        }
    }

    /// Execute a command and map the outcome to a reply
    pub fn execute(&self, command: Command) -> Reply {
        let command_type = command.command_type();
        tracing::debug!(command = %command_type, "Executing command");

        let result = match command {
            Command::Get { key } => self
                .point_get(&key)
                .map(|value| value.map_or(Reply::Nil, Reply::bulk)),
            Command::MGet { keys } => self
                .multi_get(&keys)
                .map(|reply| reply.map_or(Reply::Nil, Reply::Bulk)),
            Command::Set { key, value } => self.point_set(&key, &value).map(|()| Reply::Ok),
            Command::MSet { args } => self.multi_set(&args).map(|()| Reply::Ok),
            Command::Del { keys } => self.delete(&keys).map(|()| Reply::Ok),
        };

        match result {
            Ok(reply) => reply,
            Err(DsError::MalformedCall(reason)) => {
                tracing::debug!(command = %command_type, "Rejected: {}", reason);
                Reply::Nil
            }
            Err(e) => {
                tracing::warn!(command = %command_type, "Engine error: {}", e);
                Reply::error(e.to_string())
            }
        }
    }

    /// Look up one key
    pub fn point_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let roptions = self.ctx.read_options();
        self.ctx.engine().get(&roptions, key)
    }

    /// Look up several keys and aggregate the hits into one reply
    pub fn multi_get<K: AsRef<[u8]>>(&self, keys: &[K]) -> Result<Option<Bytes>> {
        let roptions = self.ctx.read_options();
        let mut reply = Aggregator::new();

        for key in keys {
            let key = key.as_ref();
            match self.ctx.engine().get(&roptions, key) {
                Ok(Some(value)) => {
                    reply.push(key, &value);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(keys = keys.len(), "Multi get aborted: {}", e);
                    return Err(e);
                }
            }
        }

        tracing::debug!(keys = keys.len(), hits = reply.len(), "Multi get");
        Ok(reply.finish())
    }

    /// Store one key
    pub fn point_set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let woptions = self.ctx.write_options();
        self.ctx.engine().put(&woptions, key, value)
    }

    /// Store several keys atomically from interleaved `key value ...` args
    pub fn multi_set<K: AsRef<[u8]>>(&self, args: &[K]) -> Result<()> {
        if args.is_empty() || args.len() % 2 != 0 {
            return Err(DsError::MalformedCall(format!(
                "expected key/value pairs, got {} argument(s)",
                args.len()
            )));
        }

        let woptions = self.ctx.write_options();
        let mut batch = self.ctx.write_batch();
        for pair in args.chunks_exact(2) {
            batch.put(pair[0].as_ref(), pair[1].as_ref());
        }

        tracing::debug!(pairs = batch.len(), "Committing multi set");
        self.ctx.engine().write(&woptions, &batch)
    }

    /// Remove one or more keys; several keys are removed atomically
    pub fn delete<K: AsRef<[u8]>>(&self, keys: &[K]) -> Result<()> {
        if keys.is_empty() {
            return Err(DsError::MalformedCall("no keys to delete".to_string()));
        }

        let woptions = self.ctx.write_options();
        match keys {
            [key] => self.ctx.engine().delete(&woptions, key.as_ref()),
            _ => {
                let mut batch = self.ctx.write_batch();
                for key in keys {
                    batch.delete(key.as_ref());
                }
                tracing::debug!(keys = batch.len(), "Committing multi delete");
                self.ctx.engine().write(&woptions, &batch)
            }
        }
    }
}
