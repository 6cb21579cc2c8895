use std::io::Read;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use schedule_block::config::ServerConfig;
use schedule_block::display::{print_schedule, write_schedule_to_file};
use schedule_block::editor::actions::ImportOutcome;
use schedule_block::editor::ScheduleEditor;
use schedule_block::host::LogNotifier;
use schedule_block::transfer::{acquire_import, read_document, DirectorySink, FilePicker};
use schedule_block::web;

/// Reads the import file from a path, or from stdin when no path is given
struct CliPicker {
    path: Option<PathBuf>,
}

#[async_trait]
impl FilePicker for CliPicker {
    async fn pick_file(&self) -> schedule_block::Result<Option<String>> {
        match &self.path {
            Some(path) => Ok(Some(tokio::fs::read_to_string(path).await?)),
            None => {
                let text = tokio::task::spawn_blocking(|| {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text).map(|_| text)
                })
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;
                Ok(if text.trim().is_empty() { None } else { Some(text) })
            }
        }
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  schedule-block web [port] [field-value.json]   serve the schedule field over HTTP");
    println!("  schedule-block show <file> [out.txt]           print a schedule, or write it as text");
    println!("  schedule-block export <file> [out-dir]         write schedule-<millis>.json");
    println!("  schedule-block import [file]                   validate an export (stdin if no file)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ServerConfig::from_env(args.get(2).map(String::as_str).filter(|a| a.parse::<u16>().is_ok()));

    match args.get(1).map(String::as_str) {
        Some("web") => {
            let initial_value = match args.iter().skip(2).find(|a| a.parse::<u16>().is_err()) {
                Some(path) => Some(std::fs::read_to_string(path)?),
                None => None,
            };
            println!("Starting schedule field server on port {}...", config.port);
            println!("Access the API at http://localhost:{}/api/field", config.port);
            web::start_server(config, initial_value).await?;
        }
        Some("show") => {
            let Some(path) = args.get(2) else {
                print_usage();
                return Ok(());
            };
            let document = read_document(path)?;
            match args.get(3) {
                Some(out) => {
                    write_schedule_to_file(&document, out)?;
                    println!("Schedule written to {}", out);
                }
                None => print_schedule(&document),
            }
        }
        Some("export") => {
            let Some(path) = args.get(2) else {
                print_usage();
                return Ok(());
            };
            let out_dir = args.get(3).cloned().unwrap_or_else(|| ".".to_string());
            let editor = ScheduleEditor::new(&read_document(path)?, config.block.clone());
            let notifier = LogNotifier;
            if let Some(dialog) = editor.export(&notifier) {
                let saved = dialog.download(&DirectorySink::new(out_dir), &notifier, Utc::now())?;
                println!("Schedule exported to {}", saved.display());
            }
        }
        Some("import") => {
            let picker = CliPicker { path: args.get(2).map(PathBuf::from) };
            let acquired = acquire_import(&picker, config.import_timeout).await;
            let mut editor = ScheduleEditor::new(&Default::default(), config.block.clone());
            match editor.finish_import(acquired, &LogNotifier) {
                ImportOutcome::Imported => {
                    println!("{}", serde_json::to_string_pretty(&editor.serialize())?);
                }
                ImportOutcome::Cancelled => {
                    println!("Import cancelled");
                    // the stdin reader may still be blocked; don't wait for it
                    std::process::exit(0);
                }
                ImportOutcome::Failed => std::process::exit(1),
            }
        }
        _ => print_usage(),
    }

    Ok(())
}
