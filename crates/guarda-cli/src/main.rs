mod commands;
mod config;
mod render;

use crate::commands::{Command, Credentials};
use crate::config::GuardaConfig;
use clap::Parser;
use guarda_core::{BlobStore, FileBlobStore, LedgerStore};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "guarda",
    about = "GUARDA: registro de itens guardados na chapelaria"
)]
struct Args {
    /// Arquivo de configuração TOML
    #[arg(long, env = "GUARDA_CONFIG")]
    config: Option<PathBuf>,

    /// Diretório do estado salvo (sobrepõe o da configuração)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Command,
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_notices<S: BlobStore>(store: &mut LedgerStore<S>) {
    for notice in store.take_notices() {
        eprintln!("[guarda] aviso: {notice}");
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = GuardaConfig::load(args.config.as_deref())?;
    init_tracing(config.log_filter());

    let state_dir = args.state_dir.unwrap_or_else(|| config.state_dir());
    tracing::debug!(state_dir = %state_dir.display(), "abrindo estado");

    let mut store = LedgerStore::open(FileBlobStore::new(state_dir));
    print_notices(&mut store);

    let stdout = io::stdout();
    let outcome = commands::execute(&mut store, &args.credentials, args.command, &mut stdout.lock());
    print_notices(&mut store);

    outcome
}
