mod auth;
mod ipc;
mod model;
mod pipeline;
mod report;
mod screen;
mod store;

use std::io::{self, BufRead, Write};

use tracing::warn;
use tracing_subscriber::EnvFilter;

use report::{GeminiClient, ReportClient, ReportError, StubReportClient, UnconfiguredClient};

fn report_client_from_env() -> Box<dyn ReportClient> {
    if std::env::var("FITBOOKD_REPORT_STUB").map_or(false, |v| v == "1") {
        warn!("report stub enabled; analyses are canned placeholders");
        return Box::new(StubReportClient);
    }
    match GeminiClient::from_env() {
        Ok(client) => Box::new(client),
        Err(ReportError::NotConfigured(reason)) => {
            warn!(%reason, "report service not configured; submissions will fail until it is");
            Box::new(UnconfiguredClient { reason })
        }
        Err(e) => {
            warn!(error = %e, "report client setup failed");
            Box::new(UnconfiguredClient {
                reason: e.to_string(),
            })
        }
    }
}

fn main() {
    // stdout carries the protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let mut state = ipc::AppState::new(report_client_from_env());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; ignore.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
