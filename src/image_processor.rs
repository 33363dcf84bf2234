//! # Image Processing Module
//!
//! Questo modulo implementa l'encoder immagini usato dalla pipeline,
//! delegando la codifica esclusivamente a tool esterni.
//!
//! ## Formati Supportati
//!
//! | Target | Tool Utilizzati (priorità) |
//! |--------|----------------------------|
//! | WebP   | cwebp, magick              |
//! | AVIF   | avifenc, magick            |
//! | JPEG   | magick, convert            |
//!
//! ## Strategia Tool Selection
//!
//! 1. Per ogni target si scorre la catena di tool in ordine di priorità
//! 2. I tool non installati vengono saltati
//! 3. Se un tool fallisce si prova il successivo nella catena
//! 4. Nessun tool installato → `ConvertError::MissingDependency`
//! 5. Tutti i tool falliti → `ConvertError::Encoder` con lo stderr dell'ultimo
//!
//! ## Qualità
//!
//! La qualità arriva dal target (scala 0-100) e viene passata così com'è:
//! `-q` per cwebp e avifenc, `-quality` per ImageMagick.
//!
//! ## Esempio
//!
//! ```rust,ignore
//! let encoder = ToolImageEncoder::new();
//! encoder.encode(&input, &IMAGE_TARGETS[0], &output).await?;
//! ```

use crate::error::ConvertError;
use crate::platform::PlatformCommands;
use crate::targets::{Encoder, ImageFormat, ImageTarget};
use crate::utils::{path_arg, to_string_vec};
use anyhow::Result;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Builds a tool command line from (input, output, quality)
pub type ArgsBuilder = fn(&str, &str, u8) -> Vec<String>;

fn cwebp_args(input: &str, output: &str, quality: u8) -> Vec<String> {
    to_string_vec(["-q", &quality.to_string(), "-m", "4", "-mt", input, "-o", output])
}

fn avifenc_args(input: &str, output: &str, quality: u8) -> Vec<String> {
    to_string_vec(["-q", &quality.to_string(), "-s", "6", "-j", "all", input, output])
}

// ImageMagick 6 (`convert`) and 7 (`magick`) share the same syntax here
fn imagemagick_args(input: &str, output: &str, quality: u8) -> Vec<String> {
    to_string_vec([input, "-quality", &quality.to_string(), output])
}

static WEBP_TOOLS: [(&str, ArgsBuilder); 2] =
    [("cwebp", cwebp_args), ("magick", imagemagick_args)];
static AVIF_TOOLS: [(&str, ArgsBuilder); 2] =
    [("avifenc", avifenc_args), ("magick", imagemagick_args)];
static JPEG_TOOLS: [(&str, ArgsBuilder); 2] =
    [("magick", imagemagick_args), ("convert", imagemagick_args)];

/// Image encoder backed by external command-line tools.
///
/// No pixel data ever passes through this process: every encode spawns the
/// best available tool for the target format and waits for it to exit.
#[derive(Debug, Default, Clone)]
pub struct ToolImageEncoder;

impl ToolImageEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Tool chain for a format, best first
    pub fn tool_chain(format: ImageFormat) -> &'static [(&'static str, ArgsBuilder)] {
        match format {
            ImageFormat::WebP => &WEBP_TOOLS,
            ImageFormat::Avif => &AVIF_TOOLS,
            ImageFormat::Jpeg => &JPEG_TOOLS,
        }
    }

    async fn try_encoding_tools(
        &self,
        input: &str,
        output: &str,
        target: &ImageTarget,
        tools: &[(&str, ArgsBuilder)],
    ) -> Result<()> {
        let platform = PlatformCommands::instance();
        let mut last_failure: Option<String> = None;

        for (tool_name, args_builder) in tools {
            if !platform.is_command_available(tool_name).await {
                continue;
            }

            let args = args_builder(input, output, target.quality);
            debug!("Encoding {} with {}: {:?}", target, tool_name, args);

            let start_time = std::time::Instant::now();
            let result = Command::new(platform.get_command(tool_name))
                .args(&args)
                .kill_on_drop(true)
                .output()
                .await;
            let elapsed = start_time.elapsed();

            match result {
                Ok(out) if out.status.success() => {
                    debug!("{} encoded with {} in {:?}", target, tool_name, elapsed);
                    return Ok(());
                }
                Ok(out) => {
                    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                    warn!(
                        "{} failed for {} after {:?} ({}), trying next tool",
                        tool_name, target, elapsed, out.status
                    );
                    last_failure =
                        Some(format!("{} exited with {}: {}", tool_name, out.status, stderr));
                }
                Err(e) => {
                    warn!("Failed to execute {}: {}", tool_name, e);
                    last_failure = Some(format!("failed to execute {}: {}", tool_name, e));
                }
            }
        }

        match last_failure {
            Some(message) => {
                Err(ConvertError::encoder(target, format!("{} ({})", message, input)).into())
            }
            None => {
                let names: Vec<&str> = tools.iter().map(|(name, _)| *name).collect();
                Err(ConvertError::MissingDependency(format!(
                    "no {} encoder available, install one of: {}",
                    target.format.name(),
                    names.join(", ")
                ))
                .into())
            }
        }
    }
}

impl Encoder<ImageTarget> for ToolImageEncoder {
    async fn encode(&self, input: &Path, target: &ImageTarget, output: &Path) -> Result<()> {
        let input_str = path_arg(input)?;
        let output_str = path_arg(output)?;

        self.try_encoding_tools(input_str, output_str, target, Self::tool_chain(target.format))
            .await
    }
}
