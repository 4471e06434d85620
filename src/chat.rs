//! Interactive terminal front-end over the same session type the web UI uses.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::constants;
use crate::gemini::TextGenerator;
use crate::session::Session;

/// Writes every turn of the session, in order, role-tagged. No state change.
pub fn render_history<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    for turn in session.transcript().turns() {
        writeln!(out, "{}> {}", turn.role, turn.content)?;
    }
    Ok(())
}

/// Runs a chat session on stdin/stdout until `/quit` or EOF.
pub async fn run_chat(generator: Arc<dyn TextGenerator>) -> Result<()> {
    let mut session = Session::new(generator);
    info!("Starting terminal chat session");

    println!("{} — {}", constants::PAGE_TITLE, constants::PAGE_DESCRIPTION);
    println!("Type a message, /history to reprint the conversation, /quit to leave.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match text {
            "/quit" => break,
            "/history" => {
                render_history(&session, &mut io::stdout())?;
                continue;
            }
            _ => {}
        }

        println!("({})", constants::BUSY_MESSAGE);
        match session.submit(text).await {
            Ok(turn) => println!("{}> {}", turn.role, turn.content),
            Err(err) => eprintln!("error: {err}"),
        }
    }

    info!(turns = session.transcript().len(), "Chat session finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GenerateError;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    #[tokio::test]
    async fn history_lists_turns_in_order() {
        let mut session = Session::new(Arc::new(Echo));
        session.submit("Hello").await.unwrap();

        let mut out = Vec::new();
        render_history(&session, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "user> Hello\nassistant> echo: Hello\n"
        );
    }
}
