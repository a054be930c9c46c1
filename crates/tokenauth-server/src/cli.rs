use clap::Parser;
use std::path::PathBuf;

/// HTTP service guarded by a live-reloaded bearer token file.
#[derive(Parser, Debug)]
#[command(name = "tokenauth-server", version, about)]
pub struct Args {
    /// Token file path (default: <config dir>/tokenauth/tokens.yml).
    #[arg(short = 't', long)]
    pub tokens_file: Option<PathBuf>,

    /// Address to bind to.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Log filter override (e.g. debug, tokenauth=trace).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
