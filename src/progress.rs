//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di conversione.
//!
//! ## Responsabilità:
//! - Progress bar con `indicatif` per feedback real-time (un file = un passo)
//! - Tracking statistiche (file convertiti, output scritti, byte scritti, errori)
//! - Riepilogo human-readable a fine pipeline
//!
//! La progress bar è nascosta con `--no-progress` e nei test.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========>-------------------------------] 3/14 (21%) icons/sun.png
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Manages progress reporting for one pipeline
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager, hidden when `visible` is false
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Set the message shown next to the bar without incrementing
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Mark one more file as done
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Clear the bar, leaving the terminal to the log lines
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Statistics tracker for conversion results
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    pub files_converted: usize,
    pub outputs_written: usize,
    pub bytes_written: u64,
    pub files_failed: usize,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_output(&mut self, size: u64) {
        self.outputs_written += 1;
        self.bytes_written += size;
    }

    pub fn add_converted(&mut self) {
        self.files_converted += 1;
    }

    pub fn add_failed(&mut self) {
        self.files_failed += 1;
    }

    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "Converted: {} files | Outputs: {} | Written: {}",
            self.files_converted,
            self.outputs_written,
            FileManager::format_size(self.bytes_written)
        );
        if self.files_failed > 0 {
            summary.push_str(&format!(" | Failed: {}", self.files_failed));
        }
        summary
    }
}
