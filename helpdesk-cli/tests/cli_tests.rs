use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use helpdesk_cli::{Cli, Command};

#[test]
fn command_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn serve_defaults() {
    let cli = Cli::try_parse_from(["helpdesk", "serve"]).unwrap();
    match cli.command {
        Command::Serve { host, timeout_secs, .. } => {
            assert_eq!(host, "127.0.0.1");
            assert_eq!(timeout_secs, 60);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn ask_with_agent_flag() {
    let cli = Cli::try_parse_from(["helpdesk", "--log-json", "ask", "How do I export?", "--agent"])
        .unwrap();
    assert!(cli.log_json);
    assert_eq!(cli.command, Command::Ask { question: "How do I export?".into(), agent: true });
}

#[test]
fn index_takes_path_and_namespace() {
    let cli =
        Cli::try_parse_from(["helpdesk", "index", "chunks.jsonl", "--namespace", "docs"]).unwrap();
    assert_eq!(
        cli.command,
        Command::Index { path: PathBuf::from("chunks.jsonl"), namespace: Some("docs".into()) }
    );
}

#[test]
fn clear_and_stats_parse() {
    let cli = Cli::try_parse_from(["helpdesk", "clear", "--yes"]).unwrap();
    assert_eq!(cli.command, Command::Clear { namespace: None, yes: true });

    let cli = Cli::try_parse_from(["helpdesk", "stats"]).unwrap();
    assert_eq!(cli.command, Command::Stats);
}

#[test]
fn ask_requires_a_question() {
    assert!(Cli::try_parse_from(["helpdesk", "ask"]).is_err());
}
