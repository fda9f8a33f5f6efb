use std::io::Write;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{Session, SessionBuilder};
use crate::core::AppConfig;
use crate::openai::{ChatCompletion, Client, GenerationParams};

pub const DEFAULT_MODEL: &str = "mistral";

const SYSTEM_PROMPT: &str = "Enter system prompt >>> ";
const USER_PROMPT: &str = ">>> ";

/// Where operator input comes from. `None` means the operator is done
/// (EOF or Ctrl-C).
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.is_empty() {
                    self.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => Ok(None),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Asks for the optional system prompt once, then answers user turns
/// until the input runs out. Any failure from the model server ends
/// the conversation.
pub async fn converse<C, L, W>(session: &mut Session<C>, input: &mut L, out: &mut W) -> Result<()>
where
    C: ChatCompletion,
    L: LineSource,
    W: Write,
{
    let Some(system_prompt) = input.read_line(SYSTEM_PROMPT)? else {
        return Ok(());
    };
    session.set_system_prompt(&system_prompt)?;

    while let Some(line) = input.read_line(USER_PROMPT)? {
        let reply = session.next_turn(&line).await?;
        writeln!(out, "{}", reply.display())?;
        out.flush()?;
    }

    tracing::debug!(
        "Chat ended with {} messages in transcript",
        session.transcript().len()
    );

    Ok(())
}

pub async fn run(config: &AppConfig, model: &str) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let client = Client::new(&config.api_base_url, &config.api_key, config.request_timeout);
    let mut session = SessionBuilder::new(GenerationParams::chat(model))
        .max_turns(config.max_turns)
        .build(client);

    tracing::info!("Chatting with {} at {}", model, config.api_base_url);

    let mut stdout = std::io::stdout();
    converse(&mut session, &mut rl, &mut stdout).await
}
