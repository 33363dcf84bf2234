//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore custom della conversione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi con il path coinvolto
//! - Integra con `thiserror` e `anyhow` per la propagazione
//!
//! ## Categorie di errori:
//! - `Filesystem`: Errori di I/O (creazione directory, scrittura, walk)
//! - `InvalidPath`: Path di input non riconducibile alla sua root
//! - `Encoder`: Il tool di encoding rifiuta l'input o termina con errore
//! - `MissingDependency`: Tool esterno mancante (cwebp, avifenc, ffmpeg)
//! - `Cancelled`: Stop signal ricevuto durante il batch
//! - `InvalidState`: Batch runner riutilizzato dopo uno stato terminale
//! - `BatchFailed`: Riepilogo in modalità keep-going
//!
//! Una root di input assente NON è un errore: la pipeline viene saltata
//! e il report lo segnala con `skipped = true`.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !tool_exists {
//!     return Err(ConvertError::MissingDependency("ffmpeg".to_string()).into());
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for asset conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Encoder error ({target}): {message}")]
    Encoder { target: String, message: String },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Conversion cancelled by user")]
    Cancelled,

    #[error("Invalid batch state: {0}")]
    InvalidState(String),

    #[error("{failed} file(s) failed to convert, first error: {first}")]
    BatchFailed { failed: usize, first: String },
}

impl ConvertError {
    /// Wraps an I/O error together with the path it happened on
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn encoder(target: impl ToString, message: impl ToString) -> Self {
        Self::Encoder {
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    /// True for the filesystem class of errors (I/O and path derivation)
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Filesystem { .. } | Self::InvalidPath(_))
    }

    /// True for the encoder class of errors (tool failure or tool missing)
    pub fn is_encoder(&self) -> bool {
        matches!(self, Self::Encoder { .. } | Self::MissingDependency(_))
    }
}
