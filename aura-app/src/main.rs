//! Aura host entry point.
//!
//! Loads settings, builds the engine, replays a recorded input script into it
//! and prints every emitted event to stdout as one JSON object per line.
//!
//! ```text
//! aura [--settings PATH] [--init-settings] [SCRIPT | -]
//! ```
//!
//! Without a script path (or with `-`) the script is read from stdin.

mod replay;
mod settings;

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use aura_core::AuraEngine;
use serde::Serialize;
use serde_json::json;
use settings::{default_settings_path, load_settings, save_settings};
use tokio::sync::broadcast;
use tracing::{info, warn};

struct CliArgs {
    settings_path: PathBuf,
    init_settings: bool,
    script: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = CliArgs {
        settings_path: default_settings_path(),
        init_settings: false,
        script: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => {
                let path = iter.next().context("--settings needs a path")?;
                args.settings_path = PathBuf::from(path);
            }
            "--init-settings" => args.init_settings = true,
            "-" => args.script = None,
            other if other.starts_with("--") => bail!("unknown flag {other}"),
            other => args.script = Some(PathBuf::from(other)),
        }
    }
    Ok(args)
}

fn read_script(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("reading script from stdin")?;
            Ok(raw)
        }
    }
}

fn emit<T: Serialize>(kind: &str, payload: &T) {
    println!("{}", json!({ "event": kind, "payload": payload }));
}

/// Forward one broadcast stream to stdout until the engine goes away.
fn spawn_printer<T>(kind: &'static str, mut rx: broadcast::Receiver<T>) -> tokio::task::JoinHandle<()>
where
    T: Serialize + Clone + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => emit(kind, &ev),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(kind, skipped = n, "event printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── Tracing ───────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aura=info")),
        )
        .init();

    let args = parse_args()?;
    let app_settings = load_settings(&args.settings_path);
    if args.init_settings {
        save_settings(&args.settings_path, &app_settings)
            .with_context(|| format!("writing {}", args.settings_path.display()))?;
        info!(path = %args.settings_path.display(), "settings written");
    }

    let lines = replay::parse_script(&read_script(args.script.as_ref())?)?;
    info!(lines = lines.len(), "script loaded");

    let config = app_settings.to_engine_config();
    let drain = Duration::from_millis(config.log_display_ms + config.tick_interval_ms * 4);
    let engine = AuraEngine::new(config);

    let printers = vec![
        spawn_printer("status", engine.subscribe_status()),
        spawn_printer("gesture", engine.subscribe_gestures()),
        spawn_printer("log", engine.subscribe_logs()),
        spawn_printer("click", engine.subscribe_clicks()),
        spawn_printer("ambient", engine.subscribe_ambient()),
    ];

    engine.start()?;
    let sink = engine.input_sink();
    let accepted = replay::replay(&lines, &sink).await?;

    // Let pending log lines expire before stopping.
    tokio::time::sleep(drain).await;
    engine.stop()?;

    emit("snapshot", &engine.snapshot());
    let diag = engine.pipeline_diagnostics_snapshot();
    info!(
        accepted,
        hand_frames = diag.hand_frames,
        face_frames = diag.face_frames,
        transcripts = diag.transcripts,
        dropped = diag.dropped_inputs,
        gesture_changes = diag.gesture_changes,
        clicks = diag.clicks,
        "replay finished"
    );

    // Dropping the engine closes the channels once the pipeline exits.
    drop(engine);
    for printer in printers {
        let handle = printer.abort_handle();
        if tokio::time::timeout(Duration::from_millis(500), printer)
            .await
            .is_err()
        {
            handle.abort();
        }
    }
    Ok(())
}
