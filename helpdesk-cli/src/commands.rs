use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use helpdesk_agent::{Assistant, RagAnswer, Settings};
use helpdesk_model::ChatMessage;
use helpdesk_server::{AppState, ServerConfig, run_server};
use helpdesk_telemetry::{LogFormat, SharedTraceStorage, init_telemetry, init_with_storage};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::chunks::read_chunks;
use crate::cli::{Cli, Command};

const SERVICE_NAME: &str = "helpdesk";

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = if cli.log_json { LogFormat::Json } else { LogFormat::Pretty };
    let traces = Arc::new(SharedTraceStorage::new());

    let logging = match &cli.command {
        Command::Serve { .. } => init_with_storage(SERVICE_NAME, format, traces.clone()),
        _ => init_telemetry(SERVICE_NAME, format),
    };
    logging.context("failed to initialize logging")?;

    let settings = Settings::from_env()?;
    info!(?settings, "settings loaded");
    let assistant = Assistant::connect(&settings).await?;

    match cli.command {
        Command::Serve { host, port, timeout_secs } => {
            let config = ServerConfig::new(host, port)
                .with_request_timeout(Duration::from_secs(timeout_secs));
            run_server(config, AppState::new(Arc::new(assistant), traces)).await
        }
        Command::Ask { question, agent } => ask(&assistant, &question, agent).await,
        Command::Index { path, namespace } => {
            let file = File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let chunks = read_chunks(BufReader::new(file))?;
            let indexed = assistant.indexer(namespace.as_deref()).index(chunks).await?;
            println!("Indexed {indexed} chunks from {}", path.display());
            Ok(())
        }
        Command::Clear { namespace, yes } => {
            let target = namespace.as_deref().or(settings.pinecone_namespace.as_deref());
            let label = target.unwrap_or("(default)");
            if !yes {
                bail!("refusing to clear namespace {label} without --yes");
            }
            assistant.indexer(target).clear().await?;
            println!("Cleared namespace {label}");
            Ok(())
        }
        Command::Stats => {
            let stats = assistant.indexer(None).stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

async fn ask(assistant: &Assistant, question: &str, agent: bool) -> anyhow::Result<()> {
    let span = info_span!("cli.ask", request.id = %Uuid::new_v4(), agent);

    if agent {
        let reply = assistant
            .agentic()
            .reply(&[ChatMessage::user(question)])
            .instrument(span)
            .await?;
        println!("{reply}");
        return Ok(());
    }

    let answer = assistant.direct().answer(question, &[]).instrument(span).await?;
    print!("{}", render_answer(&answer));
    Ok(())
}

/// Answer text followed by a numbered source list.
pub fn render_answer(answer: &RagAnswer) -> String {
    let mut out = format!("{}\n", answer.answer);
    if !answer.sources.is_empty() {
        out.push_str("\nSources:\n");
        for (i, source) in answer.sources.iter().enumerate() {
            let section = match &source.subsection {
                Some(sub) => format!("{} ({sub})", source.section),
                None => source.section.clone(),
            };
            let line =
                format!("[{}] {} - {} ({:.2})\n", i + 1, source.source, section, source.score);
            out.push_str(&line);
        }
    }
    out
}
