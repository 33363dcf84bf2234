//! # Web Asset Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap` (tutti opzionali)
//! - Inizializzazione del sistema di logging con `tracing`
//! - Collegamento di Ctrl-C allo stop signal del batch
//! - Creazione della configurazione e avvio del batch runner
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (nessuno è obbligatorio)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Risolve la project root (default: directory corrente)
//! 4. Converte `raw-assets/images` → `public/images` (e i video se richiesto)
//! 5. Exit code 0 in caso di successo, diverso da 0 al primo errore
//!
//! ## Esempio di utilizzo:
//! ```bash
//! web-asset-converter
//! web-asset-converter --videos --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use web_asset_converter::{BatchRunner, Config, FailurePolicy, StopSignal};

#[derive(Parser)]
#[command(name = "web-asset-converter")]
#[command(about = "Convert raw-assets/ images and videos into web variants under public/")]
struct Args {
    /// Project root containing raw-assets/ and public/ (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Also convert videos (WebM + MP4)
    #[arg(long)]
    videos: bool,

    /// Do not convert images
    #[arg(long)]
    skip_images: bool,

    /// Continue with the next file when one fails, report failures at the end
    #[arg(long)]
    keep_going: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let project_root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let config = Config {
        run_images: !args.skip_images,
        run_videos: args.videos,
        failure_policy: if args.keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::FailFast
        },
        show_progress: !args.no_progress,
        ..Config::for_project_root(&project_root)
    };

    info!("Converting assets under: {}", project_root.display());

    let (stop_sender, stop_signal) = StopSignal::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current encode is aborted");
            let _ = stop_sender.send(());
        }
    });

    // The runner already logged the failure line
    let mut runner = BatchRunner::new(config).with_stop_signal(stop_signal);
    match runner.run().await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}
