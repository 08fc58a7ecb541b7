use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "hiveinterpreter", about = "JSON-RPC reverse proxy for a Hive-compatible node ecosystem")]
pub struct Config {
    /// Enable verbose logging. Shows every normalized request, route decision,
    /// and cache lookup. When off, only warnings and the `LONG:`-tagged slow
    /// request log survive.
    #[arg(short, long, env = "HIVEINTERPRETER_DEBUG", default_value = "false")]
    pub debug: bool,

    /// Worker tasks per upstream pool.
    #[arg(short, long, env = "HIVEINTERPRETER_WORKERS", default_value = "64")]
    pub workers: usize,

    /// Queue slots per worker. Pool capacity is `workers * queue`.
    #[arg(short, long, env = "HIVEINTERPRETER_QUEUE", default_value = "8")]
    pub queue: usize,

    /// Lite-node upstream URL.
    #[arg(long, env = "HIVEINTERPRETER_LITE", default_value = "http://127.0.0.1:8080")]
    pub lite: String,

    /// Full-node upstream URL.
    #[arg(long, env = "HIVEINTERPRETER_FULL", default_value = "http://127.0.0.1:8090")]
    pub full: String,

    /// Hivemind (social indexer) upstream URL. Empty disables hive routing.
    #[arg(long, env = "HIVEINTERPRETER_HIVE", default_value = "")]
    pub hive: String,

    /// Transaction-broadcast upstream URL. Empty means: reuse `lite`'s target
    /// but keep a dedicated pool for it regardless.
    #[arg(long, env = "HIVEINTERPRETER_PUSH", default_value = "")]
    pub push: String,

    /// Unix domain socket path to listen on.
    #[arg(short, long, env = "HIVEINTERPRETER_LISTEN", default_value = "/dev/shm/hiveinterpreter.sock")]
    pub listen: String,
}

impl Config {
    /// The effective push target: `push` if set, else `lite`. The pool
    /// remains distinct from the lite pool even when the URLs coincide.
    pub fn push_target(&self) -> &str {
        if self.push.is_empty() { &self.lite } else { &self.push }
    }

    pub fn hive_enabled(&self) -> bool {
        !self.hive.is_empty()
    }

    pub fn push_enabled(&self) -> bool {
        true
    }
}
