use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use hiveinterpreter::config::Config;
use hiveinterpreter::frontend::{jsonrpc, rest, status};
use hiveinterpreter::gateway::Gateway;
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;

/// Duplicates log lines to both stdout and `hiveinterpreter.log`, matching
/// the teacher's single `tracing_subscriber::fmt()` setup but fanned out to
/// two sinks since this crate has no console attached when run as a daemon.
#[derive(Clone)]
struct DualWriter {
    file: Arc<std::sync::Mutex<std::fs::File>>,
}

impl std::io::Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::Write::write_all(&mut std::io::stdout(), buf)?;
        self.file.lock().expect("log file mutex poisoned").write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::Write::flush(&mut std::io::stdout())?;
        self.file.lock().expect("log file mutex poisoned").flush()
    }
}

impl<'a> MakeWriter<'a> for DualWriter {
    type Writer = DualWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::main]
async fn main() {
    let config = Config::parse();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("hiveinterpreter.log")
        .expect("failed to open hiveinterpreter.log");
    let writer = DualWriter { file: Arc::new(std::sync::Mutex::new(log_file)) };

    let log_level = if config.debug { "debug,hyper=info,reqwest=info" } else { "warn,hiveinterpreter=info" };
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    info!(
        listen = %config.listen,
        workers = %config.workers,
        queue = %config.queue,
        lite = %config.lite,
        full = %config.full,
        hive_enabled = config.hive_enabled(),
        debug = config.debug,
        "starting hiveinterpreter"
    );

    let gateway = Arc::new(Gateway::new(config.clone()));

    let app = Router::new()
        .route("/", post(jsonrpc::handler))
        .route("/status", get(status))
        .route("/v1/{api}/{method}", get(rest::handler).post(rest::handler))
        .fallback(get(rest::invalid_path).post(rest::invalid_path))
        .with_state(gateway);

    if std::path::Path::new(&config.listen).exists() {
        std::fs::remove_file(&config.listen).expect("failed to remove stale socket");
    }
    let listener = tokio::net::UnixListener::bind(&config.listen).expect("failed to bind unix socket");
    std::fs::set_permissions(&config.listen, std::fs::Permissions::from_mode(0o777))
        .expect("failed to chmod unix socket");

    info!(path = %config.listen, "hiveinterpreter listening");
    axum::serve(listener, app).await.expect("server error");
}
