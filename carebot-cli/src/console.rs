//! Interactive terminal front end.

use std::fmt::Write as _;

use anyhow::Result;
use carebot_chat::{ConversationOrchestrator, TurnResponse};
use carebot_rag::Chunk;
use carebot_session::{ConversationHistory, SessionStore};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{info, warn};

const PROMPT: &str = "you> ";

/// What a line typed at the console asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Utterance(String),
    History,
    Sources,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ConsoleInput::Empty;
        }
        if !line.starts_with('/') {
            return ConsoleInput::Utterance(line.to_string());
        }
        match line.to_ascii_lowercase().as_str() {
            "/history" => ConsoleInput::History,
            "/sources" => ConsoleInput::Sources,
            "/help" | "/?" => ConsoleInput::Help,
            "/quit" | "/exit" | "/q" => ConsoleInput::Quit,
            _ => ConsoleInput::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Type a question and press Enter.
  /history  show this conversation
  /sources  show where the last answer came from
  /quit     leave";

/// Render the conversation as `role: content` lines.
pub fn format_history(history: &ConversationHistory) -> String {
    if history.is_empty() {
        return "(no messages yet)".to_string();
    }
    let mut out = String::new();
    for message in history.messages() {
        let _ = writeln!(out, "{}: {}", message.role, message.content);
    }
    out.trim_end().to_string()
}

/// Render the distinct source pages of `chunks`, in retrieved order.
pub fn format_sources(chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        return "(no sources)".to_string();
    }
    let mut seen: Vec<String> = Vec::new();
    for chunk in chunks {
        let label = match (chunk.source(), chunk.page()) {
            (Some(source), Some(page)) => format!("{source} (page {page})"),
            (Some(source), None) => source.to_string(),
            _ => chunk.document_id.clone(),
        };
        if !seen.contains(&label) {
            seen.push(label);
        }
    }
    seen.iter().map(|label| format!("- {label}")).collect::<Vec<_>>().join("\n")
}

/// Print one turn's answer.
pub fn print_response(response: &TurnResponse) {
    println!("carebot> {}", response.answer);
}

/// Run the read-eval-print loop until `/quit`, Ctrl-D or Ctrl-C.
///
/// A failed turn prints its error and the loop carries on; the session
/// history is unchanged by the failure.
pub async fn run_console(
    orchestrator: &ConversationOrchestrator,
    sessions: &SessionStore,
    session_id: &str,
) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut last_sources: Vec<Chunk> = Vec::new();

    println!("Healthcare Chatbot (session {session_id}). Type /help for commands.");
    loop {
        let line = match tokio::task::block_in_place(|| editor.readline(PROMPT)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match ConsoleInput::parse(&line) {
            ConsoleInput::Empty => continue,
            ConsoleInput::Quit => break,
            ConsoleInput::Help => println!("{HELP}"),
            ConsoleInput::History => {
                let history = sessions.history(session_id).await.unwrap_or_default();
                println!("{}", format_history(&history));
            }
            ConsoleInput::Sources => println!("{}", format_sources(&last_sources)),
            ConsoleInput::Unknown(command) => {
                println!("unknown command {command}; type /help for the list");
            }
            ConsoleInput::Utterance(utterance) => {
                let _ = editor.add_history_entry(utterance.as_str());
                match orchestrator.handle_turn(sessions, session_id, &utterance).await {
                    Ok(response) => {
                        print_response(&response);
                        last_sources = response.sources;
                    }
                    Err(e) => {
                        warn!(stage = %e.stage(), error = %e, "error handling user query");
                        println!("carebot> Sorry, I couldn't answer that ({e}). Please try again.");
                    }
                }
            }
        }
    }

    info!(session.id = %session_id, "console session ended");
    Ok(())
}
