//! # Web Asset Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test
//!
//! ## Architettura dei moduli:
//! - `config`: Asset root, flag del batch e validazione
//! - `error`: Tipi di errore custom (filesystem, encoder, cancellazione)
//! - `targets`: Tabelle dei target immagine/video e trait `Encoder`
//! - `file_manager`: Discovery ricorsiva dei file sorgente
//! - `image_processor`: Encoder immagini su tool esterni (cwebp, avifenc, ImageMagick)
//! - `video_processor`: Encoder video su FFmpeg
//! - `converter`: Pipeline generica, path speculari, batch runner
//! - `progress`: Progress bar e statistiche
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use web_asset_converter::{BatchRunner, Config};
//!
//! let config = Config::for_project_root(&std::env::current_dir()?);
//! let mut runner = BatchRunner::new(config);
//! runner.run().await?;
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod platform;
pub mod progress;
pub mod targets;
pub mod utils;
pub mod video_processor;

pub use config::{AssetRoot, Config, FailurePolicy};
pub use converter::{convert_images, convert_videos, BatchRunner, BatchState, StopSignal};
pub use error::ConvertError;
pub use image_processor::ToolImageEncoder;
pub use targets::{Encoder, IMAGE_TARGETS, VIDEO_TARGETS};
pub use video_processor::FfmpegVideoEncoder;
