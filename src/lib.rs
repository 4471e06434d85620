pub mod chat;
pub mod config;
pub mod constants;
pub mod gemini;
pub mod session;
pub mod web_server;

pub use config::{Config, ConfigError};
pub use gemini::{GeminiClient, GenerateError, TextGenerator};
pub use session::{Role, Session, SubmitError, Transcript, Turn};
