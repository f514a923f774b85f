use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Support assistant over a vector-indexed knowledge base.
///
/// Settings are read from the environment (and a `.env` file, if present).
#[derive(Parser, Debug)]
#[command(name = "helpdesk", version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        #[arg(long, env = "HELPDESK_HOST", default_value = "127.0.0.1")]
        host: String,
        #[arg(long, env = "HELPDESK_PORT", default_value_t = 3000)]
        port: u16,
        /// Per-request timeout in seconds.
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },
    /// Ask a single question and print the answer.
    Ask {
        question: String,
        /// Use the tool-calling assistant instead of retrieval-first answering.
        #[arg(long)]
        agent: bool,
    },
    /// Embed and upsert pre-chunked documents from a JSON-lines file.
    Index {
        path: PathBuf,
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Delete every vector in a namespace.
    Clear {
        #[arg(long)]
        namespace: Option<String>,
        /// Skip the safety check.
        #[arg(long)]
        yes: bool,
    },
    /// Print index statistics.
    Stats,
}
