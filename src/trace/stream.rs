//! Runtime trace token stream
//!
//! The instrumented program writes one trace id per line. The stream is an
//! immutable vector consumed front to back through a read cursor.
//!
//! @module trace/stream

use std::path::Path;

use tracing::debug;

use crate::core::error::{Error, Result};
use crate::instrument::TraceId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceStream {
    tokens: Vec<TraceId>,
    cursor: usize,
}

impl TraceStream {
    pub fn new(tokens: Vec<TraceId>) -> Self {
        Self { tokens, cursor: 0 }
    }

    /// Parse whitespace-separated integers
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = text
            .split_whitespace()
            .enumerate()
            .map(|(position, token)| {
                token.parse::<TraceId>().map_err(|_| Error::TraceFormat {
                    position,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(tokens))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let stream = Self::parse(&text)?;
        debug!(file = %path.display(), tokens = stream.len(), "Read trace");
        Ok(stream)
    }

    pub fn peek(&self) -> Option<TraceId> {
        self.tokens.get(self.cursor).copied()
    }

    pub fn pop(&mut self) -> Option<TraceId> {
        let token = self.peek()?;
        self.cursor += 1;
        Some(token)
    }

    /// Tokens not consumed yet
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[TraceId] {
        &self.tokens
    }
}
