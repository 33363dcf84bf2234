//! # Video Processing Module
//!
//! Questo modulo implementa l'encoder video usato dalla pipeline.
//!
//! ## Responsabilità:
//! - Transcodifica con FFmpeg verso un target (codec video, codec audio, opzioni)
//! - Attesa del termine del processo FFmpeg (segnale di completamento o errore)
//! - Riporta exit status e stderr in caso di fallimento
//! - Verifica che `ffmpeg` sia installato prima di lanciarlo
//!
//! ## Comando generato:
//! ```text
//! ffmpeg -hide_banner -loglevel error -y -i <input> \
//!        -c:v <video_codec> -c:a <audio_codec> <opzioni...> <output>
//! ```
//!
//! ## Target attuali:
//! - **WebM**: libvpx-vp9 + libopus, `-crf 30 -b:v 0`
//! - **MP4**: libx264 + aac, `-crf 28 -preset veryfast`
//!
//! Il processo figlio viene creato con `kill_on_drop`: se il future
//! dell'encode viene abbandonato (es. cancellazione) FFmpeg viene terminato.
//!
//! ## Esempio:
//! ```rust,ignore
//! let encoder = FfmpegVideoEncoder::new();
//! encoder.encode(&video_path, &VIDEO_TARGETS[0], &output).await?;
//! ```

use crate::args;
use crate::error::ConvertError;
use crate::platform::PlatformCommands;
use crate::targets::{Encoder, VideoTarget};
use crate::utils::path_arg;
use anyhow::Result;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Video encoder driving an external `ffmpeg` process
#[derive(Debug, Default, Clone)]
pub struct FfmpegVideoEncoder;

impl FfmpegVideoEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Full ffmpeg argument list for one target
    pub fn build_args(input: &str, target: &VideoTarget, output: &str) -> Vec<String> {
        let mut args = args![
            "-hide_banner",
            "-loglevel",
            "error",
            "-y",
            "-i",
            input,
            "-c:v",
            target.video_codec,
            "-c:a",
            target.audio_codec,
        ];
        args.extend(target.options.iter().map(|opt| opt.to_string()));
        args.push(output.to_string());
        args
    }
}

impl Encoder<VideoTarget> for FfmpegVideoEncoder {
    async fn encode(&self, input: &Path, target: &VideoTarget, output: &Path) -> Result<()> {
        let platform = PlatformCommands::instance();
        if !platform.is_command_available("ffmpeg").await {
            return Err(ConvertError::MissingDependency(
                "ffmpeg is required for video conversion".to_string(),
            )
            .into());
        }

        let args = Self::build_args(path_arg(input)?, target, path_arg(output)?);
        debug!("🎬 Running ffmpeg: {:?}", args);

        let start_time = std::time::Instant::now();
        let child = Command::new(platform.get_command("ffmpeg"))
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ConvertError::encoder(target, format!("failed to execute ffmpeg: {}", e))
            })?;

        let finished = child
            .wait_with_output()
            .await
            .map_err(|e| ConvertError::encoder(target, format!("ffmpeg did not complete: {}", e)))?;
        let duration = start_time.elapsed();

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr).trim().to_string();
            return Err(ConvertError::encoder(
                target,
                format!(
                    "ffmpeg exited with {} after {:.1}s: {}",
                    finished.status,
                    duration.as_secs_f64(),
                    stderr
                ),
            )
            .into());
        }

        debug!("✅ {} encoded in {:.1}s", target, duration.as_secs_f64());
        Ok(())
    }
}
