use clap::Parser;
use helpdesk_cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    run(Cli::parse()).await
}
