//! iconsync: keep a designer icon repository and a dev repository in step.
//!
//! # Usage
//!
//! ```text
//! iconsync init <design-repo> <dev-repo> --name <pair> [--design-dir D] [--dev-dir D] [--ext svg,png]
//! iconsync status [<pair>] [--json]
//! iconsync sync <pair> [--dev] [--dev-review] [--design] [--design-review] [--removals] [--dry-run] [--no-stage]
//! iconsync sync --all [...]
//! ```

mod commands {
    pub mod init;
    pub mod status;
    pub mod sync;
}

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "iconsync",
    version,
    about = "Reconcile icon assets between a designer repository and a dev repository",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a designer/dev repository pair.
    Init(InitArgs),

    /// Show pending changes per direction without touching either repository.
    Status(StatusArgs),

    /// Apply pending changes and stage them in their repositories.
    Sync(SyncArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Sync(args) => args.run(),
    }
}

/// Log to stderr so `--json` output stays machine-readable.
///
/// `RUST_LOG` overrides the default `info` filter. Records emitted through the
/// `log` facade by the sync engine are picked up as well.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
