mod args;
mod service;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tokio::io::BufReader;
use triage_ai::{ArtifactLoader, Predictor};
use triage_store::ArtifactStore;

use crate::args::{Cli, Command};

/// Exit code when artifacts are not loaded or a request fails.
const EXIT_UNAVAILABLE: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("triage v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let store = ArtifactStore::new(cli.artifacts.store_config())?;
    let loader = Arc::new(ArtifactLoader::new(store, cli.artifacts.names()));
    let predictor = Predictor::new(Arc::clone(&loader));

    match cli.command {
        Command::Fetch => {
            for path in loader.store().ensure_all(loader.names()).await? {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            let ready = service::startup(&loader).await;
            print_json(&service::status_report(&loader))?;
            Ok(exit_code(ready))
        }
        Command::Symptoms => {
            service::startup(&loader).await;
            match loader.bundle() {
                Some(bundle) => {
                    let symptoms: Vec<&str> = bundle.vocabulary().iter().collect();
                    print_json(&serde_json::json!({ "symptoms": symptoms }))?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    print_json(&service::status_report(&loader))?;
                    Ok(exit_code(false))
                }
            }
        }
        Command::Predict { symptoms } => {
            service::startup(&loader).await;
            let response = service::respond(&predictor, &symptoms);
            print_json(&response)?;
            Ok(exit_code(!response.is_error()))
        }
        Command::Batch => {
            service::startup(&loader).await;
            let stdin = BufReader::new(tokio::io::stdin());
            service::run_batch(&predictor, stdin, tokio::io::stdout()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_UNAVAILABLE)
    }
}
