//! Interactive terminal chat against a chatmeter proxy.

mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chatmeter_client::{
    ChatSession, FileTranscriptStore, MemoryTranscriptStore, ProxyClient, RequestMode,
    SessionError, TranscriptStore,
};
use clap::Parser;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tracing_subscriber::EnvFilter;

/// Chat with the model behind a chatmeter proxy.
#[derive(Parser)]
#[command(name = "chatmeter-chat", version)]
struct Cli {
    /// Proxy root URL.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Directory holding the persisted chat history.
    #[arg(long, default_value = ".chatmeter")]
    history_dir: PathBuf,

    /// Keep history in memory only.
    #[arg(long)]
    no_history: bool,

    /// Send only the latest message instead of the whole conversation.
    #[arg(long)]
    single_turn: bool,
}

const HELP: &str = "\
Commands:
  /reset   Clear the conversation and its saved history
  /help    Show this help
  /exit    Quit (Ctrl-D also works)";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let backend = Arc::new(
        ProxyClient::new(&cli.url).with_context(|| format!("invalid proxy url {}", cli.url))?,
    );
    let store: Arc<dyn TranscriptStore> = if cli.no_history {
        Arc::new(MemoryTranscriptStore::new())
    } else {
        Arc::new(FileTranscriptStore::new(&cli.history_dir))
    };
    let mode = if cli.single_turn {
        RequestMode::SingleTurn
    } else {
        RequestMode::MultiTurn
    };
    let session = ChatSession::open(backend, store, mode).await;

    println!("chatmeter chat: {} (type /help for commands)", cli.url);
    for turn in session.turns() {
        println!("{}\n", render::render_turn(&turn));
    }

    let mut editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("you".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        let line = match editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => line,
            Ok(Signal::CtrlD) => break,
            Ok(_) => continue,
            Err(e) => return Err(e).context("reading input"),
        };

        match line.trim() {
            "" => continue,
            "/exit" | "/quit" => break,
            "/help" => {
                println!("{HELP}");
                continue;
            }
            "/reset" => {
                session.reset().await;
                println!("History cleared.");
                continue;
            }
            _ => {}
        }

        println!("Thinking...");
        match session.submit(&line).await {
            Ok(turn) => println!("\n{}\n", render::render_turn(&turn)),
            Err(SessionError::EmptyInput) => {}
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}
