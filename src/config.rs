//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione di una run di conversione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con le asset root e i flag del batch
//! - Fornisce valori di default identici al comportamento hard-coded
//! - Fornisce validazione dei parametri prima di avviare il batch
//!
//! Non esiste un file di configurazione: i path e le qualità sono fissi,
//! la CLI può solo spostare la project root e attivare/disattivare pipeline.
//!
//! ## Parametri di configurazione:
//! - `images`: Asset root immagini (default: `raw-assets/images` → `public/images`)
//! - `videos`: Asset root video (default: `raw-assets/videos` → `public/videos`)
//! - `run_images`: Esegue la pipeline immagini (default: true)
//! - `run_videos`: Esegue la pipeline video (default: false)
//! - `failure_policy`: Fail-fast (default) o keep-going
//! - `show_progress`: Mostra la progress bar (default: true)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     run_videos: true,
//!     ..Config::for_project_root(&std::env::current_dir()?)
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};

pub const RAW_IMAGES_DIR: &str = "raw-assets/images";
pub const RAW_VIDEOS_DIR: &str = "raw-assets/videos";
pub const PUBLIC_IMAGES_DIR: &str = "public/images";
pub const PUBLIC_VIDEOS_DIR: &str = "public/videos";

/// Input directory paired with its mirrored output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoot {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl AssetRoot {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// What to do when a single file fails to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole batch on the first error
    #[default]
    FailFast,
    /// Log the failure, continue with the next file, fail at the end
    KeepGoing,
}

/// Configuration for a conversion batch
#[derive(Debug, Clone)]
pub struct Config {
    pub images: AssetRoot,
    pub videos: AssetRoot,
    pub run_images: bool,
    pub run_videos: bool,
    pub failure_policy: FailurePolicy,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_project_root(Path::new("."))
    }
}

impl Config {
    /// Builds the default layout under a project root
    pub fn for_project_root(root: &Path) -> Self {
        Self {
            images: AssetRoot::new(root.join(RAW_IMAGES_DIR), root.join(PUBLIC_IMAGES_DIR)),
            videos: AssetRoot::new(root.join(RAW_VIDEOS_DIR), root.join(PUBLIC_VIDEOS_DIR)),
            run_images: true,
            run_videos: false,
            failure_policy: FailurePolicy::FailFast,
            show_progress: true,
        }
    }

    /// Validate the asset roots of the enabled pipelines
    pub fn validate(&self) -> Result<()> {
        let enabled = [
            (self.run_images, "image", &self.images),
            (self.run_videos, "video", &self.videos),
        ];

        for (_, kind, root) in enabled.into_iter().filter(|(run, _, _)| *run) {
            if root.input == root.output {
                return Err(anyhow::anyhow!(
                    "The {} input and output directories must differ: {}",
                    kind,
                    root.input.display()
                ));
            }
            if root.output.exists() && !root.output.is_dir() {
                return Err(anyhow::anyhow!(
                    "The {} output path is not a directory: {}",
                    kind,
                    root.output.display()
                ));
            }
        }

        Ok(())
    }
}
