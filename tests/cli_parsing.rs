use std::path::PathBuf;

use clap::Parser;
use ragline::cli::{Cli, Commands};

#[test]
fn test_parse_ask_with_top_n() {
    let cli = Cli::try_parse_from(["ragline", "ask", "What is the capital of France?", "--top-n", "3"]).unwrap();

    match cli.command {
        Commands::Ask(args) => {
            assert_eq!(args.question, "What is the capital of France?");
            assert_eq!(args.top_n, Some(3));
            assert!(!args.show_sources);
        }
        other => panic!("Wrong command: {other:?}"),
    }
    assert!(!cli.json);
}

#[test]
fn test_parse_ingest_with_document_id() {
    let cli = Cli::try_parse_from(["ragline", "ingest", "notes.txt", "--document-id", "notes"]).unwrap();

    match cli.command {
        Commands::Ingest(args) => {
            assert_eq!(args.file, PathBuf::from("notes.txt"));
            assert_eq!(args.document_id.as_deref(), Some("notes"));
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["ragline", "status", "--json", "--config", "custom.yaml"]).unwrap();

    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    assert!(matches!(cli.command, Commands::Status(_)));
}

#[test]
fn test_parse_search_and_documents() {
    let cli = Cli::try_parse_from(["ragline", "search", "Germany", "-n", "2"]).unwrap();
    match cli.command {
        Commands::Search(args) => {
            assert_eq!(args.query, "Germany");
            assert_eq!(args.top_n, Some(2));
        }
        other => panic!("Wrong command: {other:?}"),
    }

    let cli = Cli::try_parse_from(["ragline", "documents"]).unwrap();
    assert!(matches!(cli.command, Commands::Documents(_)));
}

#[test]
fn test_init_force() {
    let cli = Cli::try_parse_from(["ragline", "init", "--force"]).unwrap();
    match cli.command {
        Commands::Init(args) => {
            assert!(args.force);
            assert_eq!(args.path, PathBuf::from("."));
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_ask_requires_question() {
    assert!(Cli::try_parse_from(["ragline", "ask"]).is_err());
}
