//! The per-user conversation: an append-only transcript plus one remote call
//! per submission.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gemini::{GenerateError, TextGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered list of turns for one session. Append-only: the only way in is
/// `Session::submit`, and read access is by shared slice.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("message is empty")]
    EmptyMessage,

    #[error(transparent)]
    Generation(#[from] GenerateError),
}

/// One user's conversation with the model.
///
/// Owns its transcript exclusively; `&mut self` on `submit` keeps submissions
/// strictly sequential, so a session is either idle or awaiting one reply.
pub struct Session {
    generator: Arc<dyn TextGenerator>,
    transcript: Transcript,
}

impl Session {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            transcript: Transcript::default(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Appends the user's message, asks the model for a reply, and appends
    /// that too.
    ///
    /// Only the newest message goes to the model; earlier turns stay visible
    /// to the user but are not replayed as model context. On failure the user
    /// turn is kept and no assistant turn is added, so the caller can render
    /// the error inline and accept the next submission.
    pub async fn submit(&mut self, text: &str) -> Result<Turn, SubmitError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyMessage);
        }

        self.transcript.push(Turn::user(text));

        let reply = self.generator.generate(text).await?;
        let turn = Turn::assistant(reply);
        self.transcript.push(turn.clone());
        Ok(turn)
    }
}
