//! # Converter Module
//!
//! Modulo che separa le responsabilità della conversione in sottomoduli:
//! - `batch_runner`: Orchestratore del batch (immagini → video) e state machine
//! - `pipeline`: Loop generico file × target, stop signal, report
//! - `path_resolver`: Logica di calcolo path speculari centralizzata

pub mod batch_runner;
pub mod path_resolver;
pub mod pipeline;

pub use batch_runner::{BatchReport, BatchRunner, BatchState};
pub use path_resolver::{PathResolver, RelativeIdentity};
pub use pipeline::{convert_images, convert_videos, ConversionPipeline, PipelineReport, StopSignal};

#[cfg(test)]
pub(crate) mod testing {
    //! Fake encoders and filesystem helpers shared by the converter tests

    use crate::error::ConvertError;
    use crate::targets::{Encoder, OutputTarget};
    use anyhow::Result;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use walkdir::WalkDir;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Succeed,
        FailOnCall(usize),
        Hang,
    }

    /// Writes a small placeholder per encode and records every call as
    /// `"<input file name> -> <extension>"`
    pub struct RecordingEncoder {
        mode: Mode,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingEncoder {
        pub fn new() -> Self {
            Self::with_mode(Mode::Succeed)
        }

        /// Fails on the n-th call (1-based) counted across the whole run
        pub fn failing_on(call: usize) -> Self {
            Self::with_mode(Mode::FailOnCall(call))
        }

        /// Never completes
        pub fn hanging() -> Self {
            Self::with_mode(Mode::Hang)
        }

        fn with_mode(mode: Mode) -> Self {
            Self {
                mode,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl<T: OutputTarget> Encoder<T> for RecordingEncoder {
        async fn encode(&self, input: &Path, target: &T, output: &Path) -> Result<()> {
            let call_number = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(format!(
                    "{} -> {}",
                    input.file_name().unwrap().to_string_lossy(),
                    target.extension()
                ));
                calls.len()
            };

            match self.mode {
                Mode::FailOnCall(n) if n == call_number => {
                    Err(ConvertError::encoder(target, "simulated encoder failure").into())
                }
                Mode::Hang => std::future::pending().await,
                _ => {
                    tokio::fs::write(output, format!("encoded as {}", target)).await?;
                    Ok(())
                }
            }
        }
    }

    pub fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"raw").unwrap();
    }

    /// Sorted list of files under `root`, relative and with `/` separators
    pub fn listing(root: &Path) -> Vec<String> {
        if !root.exists() {
            return Vec::new();
        }
        let mut files: Vec<String> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let relative: PathBuf = e.path().strip_prefix(root).unwrap().to_path_buf();
                relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect();
        files.sort();
        files
    }
}
