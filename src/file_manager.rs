//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file sorgente.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di tutti i file regolari sotto una root
//! - Path assoluti, ordine deterministico (per nome dentro ogni directory)
//! - Root assente = lista vuota, non un errore
//! - Utilità per dimensioni file e formattazione human-readable
//!
//! ## Note sulla traversata:
//! - I symlink vengono seguiti: un link a un file conta come file
//! - I cicli di symlink non sono gestiti in modo speciale: `walkdir` li
//!   rileva e l'errore viene propagato come `ConvertError::Filesystem`
//! - Nessun filtro per estensione: ogni file viene passato all'encoder
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::list_files(Path::new("raw-assets/images"))?;
//! for file in files {
//!     // convert file
//! }
//! ```

use crate::error::ConvertError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Manages file discovery and file-size bookkeeping
pub struct FileManager;

impl FileManager {
    /// List every regular file under `root`, recursively, as absolute paths
    pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Ok(Vec::new());
        }

        let root = std::path::absolute(root).map_err(|e| ConvertError::filesystem(root, e))?;
        let mut files = Vec::new();

        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("symlink cycle detected"));
                ConvertError::filesystem(path, source)
            })?;

            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Size in bytes of a file on disk
    pub async fn file_size(path: &Path) -> Result<u64> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| ConvertError::filesystem(path, e))?;
        Ok(metadata.len())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
