//! One-shot commands: batch generation and history management.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use playrec_config::Config;
use playrec_protocols::{CapturedStep, OutputFormat, SessionStore, Step};
use playrec_runtime::{ExportFormat, export_session};

use crate::cli::HistoryAction;
use crate::server::build_recorder;

/// Read a JSON array of captured steps and accept them in file order.
pub(crate) fn read_steps(path: &Path) -> Result<Vec<Step>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let captured: Vec<CapturedStep> = serde_json::from_str(&content)?;
    let now = Utc::now().timestamp_millis();
    Ok(captured
        .into_iter()
        .enumerate()
        .map(|(i, step)| {
            let ts = if step.timestamp > 0 { step.timestamp } else { now };
            step.accept(i, i as u64, ts)
        })
        .collect())
}

pub(crate) async fn generate(
    config: &Config,
    steps_path: &Path,
    format: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let steps = read_steps(steps_path)?;
    if steps.is_empty() {
        return Err(format!("{} contains no steps", steps_path.display()).into());
    }
    let format = match format {
        Some(raw) => raw.parse::<OutputFormat>()?,
        None => config.recording.output_format,
    };

    let recorder = build_recorder(config);
    let outcome = recorder.generate_for_steps(&steps, format).await;
    if let Some(error) = &outcome.error {
        warn!("Model generation failed, wrote fallback code instead: {}", error);
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &outcome.code)?;
            println!("Wrote {} ({} steps)", path.display(), steps.len());
        }
        None => println!("{}", outcome.code),
    }
    Ok(())
}

pub(crate) async fn history(
    config: &Config,
    action: HistoryAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = build_recorder(config);
    let sessions = recorder.sessions();

    match action {
        HistoryAction::List { format } => {
            let records = sessions.get_history().await?;
            if records.is_empty() {
                println!("No sessions recorded.");
                return Ok(());
            }
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&records)?),
                _ => {
                    println!(
                        "{:<36} {:<13} {:<11} {:>6} {:<20}",
                        "ID", "MODE", "FORMAT", "STEPS", "CREATED"
                    );
                    println!("{}", "-".repeat(90));
                    for record in records {
                        println!(
                            "{:<36} {:<13} {:<11} {:>6} {:<20}",
                            record.id,
                            record.mode.as_str(),
                            record.format.as_str(),
                            record.steps.len(),
                            record.created_at.format("%Y-%m-%d %H:%M:%S")
                        );
                    }
                }
            }
        }
        HistoryAction::Show { session_id } => match sessions.get_session(&session_id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => return Err(format!("Session not found: {}", session_id).into()),
        },
        HistoryAction::Delete { session_id } => {
            sessions.delete_session(&session_id).await?;
            println!("Deleted {}", session_id);
        }
        HistoryAction::Export {
            session_id,
            format,
            output,
        } => {
            let format = format.parse::<ExportFormat>()?;
            let record = sessions
                .get_session(&session_id)
                .await?
                .ok_or_else(|| format!("Session not found: {}", session_id))?;
            let file = export_session(&record, format)?;
            let path = output.unwrap_or_else(|| PathBuf::from(".")).join(&file.filename);
            std::fs::write(&path, &file.content)?;
            println!("Exported {} ({})", path.display(), file.mime_type);
        }
    }
    Ok(())
}
