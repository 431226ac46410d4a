use log::error;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use crate::llm::ModelChoice;
use crate::models::chat::{ Role, Transcript };
use crate::session::ChatSession;

const HELP: &str = "Commands: /model [name]  /history  /clear  /help  /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Message(String),
    ListModels,
    SelectModel(String),
    History,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "model" if arg.is_empty() => Input::ListModels,
        "model" => Input::SelectModel(arg.to_string()),
        "history" => Input::History,
        "clear" => Input::Clear,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

fn render_transcript(transcript: &Transcript) -> String {
    let mut out = String::new();
    for turn in transcript.turns() {
        let badge = match turn.role {
            Role::User => "you",
            Role::Assistant => "bot",
        };
        out.push_str(&format!("[{}] {}\n", badge, turn.content));
    }
    out
}

fn render_models(active: ModelChoice) -> String {
    ModelChoice::ALL.iter()
        .map(|m| {
            let marker = if *m == active { "*" } else { " " };
            format!("{} {}\n", marker, m.display_name())
        })
        .collect()
}

/// Terminal chat loop. Returns on `/quit` or end of input.
pub async fn run<R, W>(session: &mut ChatSession, reader: R, mut out: W) -> std::io::Result<()>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    out.write_all(format!("LLM Chatbot ({})\n{}\n", session.model().display_name(), HELP).as_bytes()).await?;
    out.write_all(render_transcript(session.transcript()).as_bytes()).await?;
    out.flush().await?;

    let mut lines = reader.lines();
    loop {
        out.write_all(b"> ").await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let reply = match parse_input(&line) {
            Input::Message(text) if text.trim().is_empty() => continue,
            Input::Message(text) => {
                let reply = session.send(&text).await;
                format!("[bot] {}\n", reply)
            }
            Input::ListModels => render_models(session.model()),
            Input::SelectModel(name) => match name.parse::<ModelChoice>() {
                Ok(model) => {
                    session.select_model(model);
                    format!("Model set to {}\n", model.display_name())
                }
                Err(e) => format!("{}\n{}", e, render_models(session.model())),
            },
            Input::History => render_transcript(session.transcript()),
            Input::Clear => match session.clear().await {
                Ok(()) => "History cleared.\n".to_string(),
                Err(e) => {
                    error!("Failed to clear chat history: {}", e);
                    format!("Could not clear history: {}\n", e)
                }
            },
            Input::Help => format!("{}\n", HELP),
            Input::Quit => break,
            Input::Unknown(name) => format!("Unknown command '/{}'. {}\n", name, HELP),
        };

        out.write_all(reply.as_bytes()).await?;
        out.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::history::{ CompactionPolicy, HistoryCompactor, JsonFileHistoryStore };
    use crate::llm::completion::{ CompletionClient, RetryPolicy };
    use crate::llm::mock::ScriptedBackend;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn parses_commands_and_messages() {
        assert_eq!(parse_input("hello /model"), Input::Message("hello /model".into()));
        assert_eq!(parse_input("/model"), Input::ListModels);
        assert_eq!(parse_input("/model  Qwen2-72B-Instruct "), Input::SelectModel("Qwen2-72B-Instruct".into()));
        assert_eq!(parse_input("/clear"), Input::Clear);
        assert_eq!(parse_input("/exit"), Input::Quit);
        assert_eq!(parse_input("/nope"), Input::Unknown("nope".into()));
    }

    #[tokio::test]
    async fn scripted_conversation() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileHistoryStore::new(dir.path().join("db.json")));
        let backend = Arc::new(ScriptedBackend::new().reply("Hello, human."));
        let retry = RetryPolicy { max_attempts: 1, delay: Duration::ZERO };
        let client = CompletionClient::new(backend.clone(), retry, ResponseCache::new(4));
        let compactor = HistoryCompactor::new(backend.clone(), CompactionPolicy::default());
        let mut session = ChatSession::open(client, compactor, store, ModelChoice::default()).await;

        let input: &[u8] = b"hi\n/model mixtral-8x7b-instruct-v0.1\n\n/quit\nignored\n";
        let mut output = Vec::new();
        run(&mut session, input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("[bot] Hello, human."));
        assert!(printed.contains("Model set to Mixtral-8x7B-Instruct-v0.1"));
        assert_eq!(session.model(), ModelChoice::Mixtral8x7bInstruct);
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(backend.calls(), 1);
    }
}
