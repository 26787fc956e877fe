//! Workflow conversion CLI.
//!
//! ```bash
//! # Convert a workflow file
//! GEMINI_API_KEY=... convert_cli --file workflow.xml
//!
//! # Convert from stdin, JSON output
//! cat workflow.xml | convert_cli --format json
//!
//! # Run the built-in two-step example
//! convert_cli --demo
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use alteryx2sql::{GeminiClient, LlmClient, WorkflowConverter, EXAMPLE_WORKFLOW_XML};

#[derive(Parser)]
#[command(name = "convert_cli")]
#[command(about = "Convert Alteryx workflow XML into a BigQuery SQL view")]
struct Cli {
    /// Workflow XML file; reads stdin when omitted
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Convert the built-in example workflow instead of reading input
    #[arg(long)]
    demo: bool,

    /// Output format
    #[arg(long, short = 'o', default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("alteryx2sql=info")),
        )
        .init();

    let cli = Cli::parse();

    let xml = if cli.demo {
        EXAMPLE_WORKFLOW_XML.to_string()
    } else if let Some(path) = &cli.file {
        match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("error: cannot read {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
    } else {
        let mut buffer = String::new();
        if let Err(err) = io::stdin().read_to_string(&mut buffer) {
            eprintln!("error: cannot read stdin: {err}");
            return ExitCode::FAILURE;
        }
        buffer
    };

    let client: Arc<dyn LlmClient> = match GeminiClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let converter = WorkflowConverter::new(client);
    let result = converter.convert(&xml).await;

    match cli.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Pretty => {
            println!("--- Conversion log ---");
            println!("{}", result.message);
            if !result.sql.is_empty() {
                println!("\n--- Generated SQL ---");
                println!("{}", result.sql);
            }
        }
    }

    ExitCode::SUCCESS
}
