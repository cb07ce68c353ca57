use std::{env, path::Path};

use anyhow::{Context, Result};
use chrono::Local;
use regsheet::{
    config::Config,
    fetch::HttpSource,
    refresh::{FetchStatus, RefreshController, Snapshot},
    report::{self, quota_remaining},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(log_level.parse().unwrap_or(Level::INFO.into()))
    });
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) config ───────────────────────────────────────────────────
    let config = Config::load().context("loading configuration")?;
    let source = HttpSource::with_timeout(config.source_url()?, config.request_timeout())
        .context("building HTTP client")?;
    info!(url = %source.url(), quota = config.quota, "polling sheet export");

    // ─── 3) start polling ────────────────────────────────────────────
    let mut controller = RefreshController::spawn(source, config.refresh_interval());
    let mut status = controller.subscribe();

    info!("commands: r = refresh, p = print report, s = status, q = quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    // ─── 4) event loop ───────────────────────────────────────────────
    let outcome: Result<()> = loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break Err(anyhow::anyhow!("refresh controller stopped unexpectedly"));
                }
                let snap = status.borrow_and_update().clone();
                log_transition(&snap, config.quota);
                if let Some(path) = &config.status_file {
                    if let Err(e) = write_status(path, &snap) {
                        error!("status file: {:#}", e);
                    }
                }
            }

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(cmd)) => match cmd.trim() {
                    "r" | "refresh" => {
                        if !controller.refresh() {
                            info!("refresh already in progress");
                        }
                    }
                    "p" | "print" => print_report(&controller.snapshot(), &config),
                    "s" | "status" => log_summary(&controller.snapshot(), config.quota),
                    "q" | "quit" => break Ok(()),
                    "" => {}
                    other => warn!(command = other, "unknown command"),
                },
                Ok(None) => {
                    info!("stdin closed; running until Ctrl-C");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "reading stdin");
                    stdin_open = false;
                }
            },

            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                break Ok(());
            }
        }
    };

    // ─── 5) teardown ─────────────────────────────────────────────────
    controller.shutdown().await;
    info!("all done");
    outcome
}

fn log_transition(snap: &Snapshot, quota: usize) {
    match &snap.status {
        FetchStatus::Loading => info!("loading sheet"),
        FetchStatus::Success { records, at } => info!(
            registered = records.len(),
            remaining = quota_remaining(quota, records.len()),
            at = %at.format("%H:%M:%S"),
            "sheet synced"
        ),
        FetchStatus::Error { message, at } => error!(
            kept = snap.records.len(),
            at = %at.format("%H:%M:%S"),
            "could not load sheet: {}",
            message
        ),
    }
}

fn log_summary(snap: &Snapshot, quota: usize) {
    let state = match &snap.status {
        FetchStatus::Loading => "loading",
        FetchStatus::Success { .. } => "ok",
        FetchStatus::Error { .. } => "error",
    };
    info!(
        state,
        registered = snap.registered(),
        quota,
        remaining = quota_remaining(quota, snap.registered()),
        last_updated = ?snap.last_updated.map(|t| t.to_rfc3339()),
        "status"
    );
    for r in snap.records.iter() {
        info!("{:>3}. {} ({})", r.sequence, r.name, r.phone);
    }
}

fn print_report(snap: &Snapshot, config: &Config) {
    if !snap.can_export() {
        warn!(
            loading = snap.status.is_loading(),
            registered = snap.registered(),
            "report unavailable while loading or with no registrants"
        );
        return;
    }
    match report::write_report(&snap.records, config.quota, &config.report, Local::now()) {
        Ok(path) => info!(path = %path.display(), "report ready"),
        Err(e) => error!("report failed: {:#}", e),
    }
}

fn write_status(path: &Path, snap: &Snapshot) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }
    let json = serde_json::to_vec_pretty(snap).context("serializing snapshot")?;
    // Write then rename so a reader never sees a half-written file.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("writing {:?}", tmp))?;
    std::fs::rename(&tmp, path).with_context(|| format!("renaming into {:?}", path))?;
    Ok(())
}
