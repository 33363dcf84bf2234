//! # Batch Runner
//!
//! Orchestratore principale: esegue la pipeline immagini, poi
//! (se abilitata) la pipeline video, e riporta successo o il primo errore.
//!
//! ## State machine:
//! ```text
//! Idle → RunningImages → RunningVideos (opzionale) → Done
//!              ↓                ↓
//!            Failed           Failed
//! ```
//! `Done` e `Failed` sono terminali: un runner terminato non può essere
//! rieseguito (`ConvertError::InvalidState`).
//!
//! ## Politica errori:
//! - Fail-fast (default): il primo errore ferma il batch, nessun report parziale
//! - Keep-going: le pipeline completano, il batch termina `Failed` con
//!   `ConvertError::BatchFailed` se almeno un file è fallito
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut runner = BatchRunner::new(Config::for_project_root(&cwd));
//! let report = runner.run().await?;
//! ```

use crate::{
    config::Config,
    converter::pipeline::{ConversionPipeline, PipelineReport, StopSignal},
    error::ConvertError,
    image_processor::ToolImageEncoder,
    targets::{Encoder, ImageTarget, VideoTarget},
    video_processor::FfmpegVideoEncoder,
};
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Lifecycle of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    RunningImages,
    RunningVideos,
    Done,
    Failed,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Aggregate result of a successful batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub images: Option<PipelineReport>,
    pub videos: Option<PipelineReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    fn pipelines(&self) -> impl Iterator<Item = &PipelineReport> {
        self.images.iter().chain(self.videos.iter())
    }

    pub fn files_failed(&self) -> usize {
        self.pipelines().map(|p| p.stats.files_failed).sum()
    }

    pub fn outputs_written(&self) -> usize {
        self.pipelines().map(|p| p.stats.outputs_written).sum()
    }

    pub fn format_summary(&self) -> String {
        let mut parts: Vec<String> = self
            .pipelines()
            .map(|p| {
                if p.skipped {
                    format!("{}s: skipped (no input directory)", p.kind)
                } else {
                    format!("{}s: {}", p.kind, p.stats.format_summary())
                }
            })
            .collect();
        parts.push(format!("in {:.1}s", self.elapsed.as_secs_f64()));
        parts.join(" | ")
    }
}

/// Runs the image pipeline and, when enabled, the video pipeline
pub struct BatchRunner<I = ToolImageEncoder, V = FfmpegVideoEncoder> {
    config: Config,
    image_encoder: I,
    video_encoder: V,
    stop: StopSignal,
    state: BatchState,
}

impl BatchRunner {
    /// Runner with the external-tool encoders
    pub fn new(config: Config) -> Self {
        Self::with_encoders(config, ToolImageEncoder::new(), FfmpegVideoEncoder::new())
    }
}

impl<I: Encoder<ImageTarget>, V: Encoder<VideoTarget>> BatchRunner<I, V> {
    pub fn with_encoders(config: Config, image_encoder: I, video_encoder: V) -> Self {
        Self {
            config,
            image_encoder,
            video_encoder,
            stop: StopSignal::none(),
            state: BatchState::Idle,
        }
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    fn transition(&mut self, next: BatchState) {
        debug!("Batch state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Runs the batch once; the runner ends in `Done` or `Failed`
    pub async fn run(&mut self) -> Result<BatchReport> {
        if self.state.is_terminal() {
            return Err(ConvertError::InvalidState(format!(
                "batch already ran and ended in {:?}",
                self.state
            ))
            .into());
        }

        if let Err(e) = self.config.validate() {
            error!("❌ Error converting assets: {:#}", e);
            return Err(e);
        }

        let start_time = Instant::now();
        let result = self.run_pipelines().await.and_then(|report| {
            let failed = report.files_failed();
            if failed > 0 {
                let first = report
                    .pipelines()
                    .find_map(|p| p.first_error.clone())
                    .unwrap_or_default();
                return Err(ConvertError::BatchFailed { failed, first }.into());
            }
            Ok(report)
        });

        match result {
            Ok(mut report) => {
                report.elapsed = start_time.elapsed();
                self.transition(BatchState::Done);
                info!("{}", report.format_summary());
                info!("✅ All assets converted successfully!");
                Ok(report)
            }
            Err(e) => {
                self.transition(BatchState::Failed);
                error!("❌ Error converting assets: {:#}", e);
                Err(e)
            }
        }
    }

    async fn run_pipelines(&mut self) -> Result<BatchReport> {
        let policy = self.config.failure_policy;
        let show_progress = self.config.show_progress;
        let mut report = BatchReport::default();

        if self.config.run_images {
            self.transition(BatchState::RunningImages);
            let pipeline = ConversionPipeline::images(&self.image_encoder)
                .with_failure_policy(policy)
                .with_progress(show_progress);
            report.images = Some(pipeline.run(&self.config.images, &mut self.stop).await?);
        } else {
            debug!("Image conversion disabled");
        }

        if self.config.run_videos {
            self.transition(BatchState::RunningVideos);
            let pipeline = ConversionPipeline::videos(&self.video_encoder)
                .with_failure_policy(policy)
                .with_progress(show_progress);
            report.videos = Some(pipeline.run(&self.config.videos, &mut self.stop).await?);
        } else {
            debug!("Video conversion disabled");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::converter::testing::{listing, touch, RecordingEncoder};
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> Config {
        Config {
            show_progress: false,
            ..Config::for_project_root(root)
        }
    }

    fn runner(
        config: Config,
        images: RecordingEncoder,
    ) -> BatchRunner<RecordingEncoder, RecordingEncoder> {
        BatchRunner::with_encoders(config, images, RecordingEncoder::new())
    }

    #[tokio::test]
    async fn test_images_only_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("raw-assets/images/logo.png"));
        touch(&root.join("raw-assets/videos/intro.mov"));

        let mut runner = runner(test_config(root), RecordingEncoder::new());
        assert_eq!(runner.state(), BatchState::Idle);

        let report = runner.run().await.unwrap();

        assert_eq!(runner.state(), BatchState::Done);
        assert!(report.videos.is_none());
        assert_eq!(report.outputs_written(), 3);
        assert_eq!(listing(&root.join("public/images")), ["logo.avif", "logo.jpg", "logo.webp"]);
        assert!(!root.join("public/videos").exists());
    }

    #[tokio::test]
    async fn test_videos_when_enabled() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("raw-assets/images/logo.png"));
        touch(&root.join("raw-assets/videos/clips/intro.mov"));

        let config = Config {
            run_videos: true,
            ..test_config(root)
        };
        let mut runner = runner(config, RecordingEncoder::new());
        let report = runner.run().await.unwrap();

        assert_eq!(runner.state(), BatchState::Done);
        assert_eq!(report.outputs_written(), 5);
        assert_eq!(
            listing(&root.join("public/videos")),
            ["clips/intro.mp4", "clips/intro.webm"]
        );
    }

    #[tokio::test]
    async fn test_missing_inputs_succeed_without_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            run_videos: true,
            ..test_config(temp_dir.path())
        };

        let mut runner = runner(config, RecordingEncoder::new());
        let report = runner.run().await.unwrap();

        assert!(report.images.as_ref().unwrap().skipped);
        assert!(report.videos.as_ref().unwrap().skipped);
        assert!(!temp_dir.path().join("public").exists());
        assert!(report.format_summary().contains("images: skipped"));
    }

    #[tokio::test]
    async fn test_image_failure_skips_videos_and_fails_batch() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("raw-assets/images/logo.png"));
        touch(&root.join("raw-assets/videos/intro.mov"));

        let config = Config {
            run_videos: true,
            ..test_config(root)
        };
        let mut runner = runner(config, RecordingEncoder::failing_on(1));
        let err = runner.run().await.unwrap_err();

        assert_eq!(runner.state(), BatchState::Failed);
        assert!(err.downcast_ref::<ConvertError>().unwrap().is_encoder());
        assert!(!root.join("public/videos").exists());
    }

    #[tokio::test]
    async fn test_terminal_state_rejects_rerun() {
        let temp_dir = TempDir::new().unwrap();
        let mut runner = runner(test_config(temp_dir.path()), RecordingEncoder::new());
        runner.run().await.unwrap();

        let err = runner.run().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::InvalidState(_))
        ));
        assert_eq!(runner.state(), BatchState::Done);
    }

    #[tokio::test]
    async fn test_keep_going_reports_batch_failure() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("raw-assets/images/a.png"));
        touch(&root.join("raw-assets/images/b.png"));

        let config = Config {
            failure_policy: FailurePolicy::KeepGoing,
            ..test_config(root)
        };
        let mut runner = runner(config, RecordingEncoder::failing_on(2));
        let err = runner.run().await.unwrap_err();

        assert_eq!(runner.state(), BatchState::Failed);
        match err.downcast_ref::<ConvertError>() {
            Some(ConvertError::BatchFailed { failed, first }) => {
                assert_eq!(*failed, 1);
                assert!(first.contains("a.png"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            listing(&root.join("public/images")),
            ["a.webp", "b.avif", "b.jpg", "b.webp"]
        );
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_running() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path());
        config.images.output = config.images.input.clone();

        let mut runner = runner(config, RecordingEncoder::new());
        assert!(runner.run().await.is_err());
        assert_eq!(runner.state(), BatchState::Idle);
        assert!(!temp_dir.path().join("public").exists());
    }

    #[tokio::test]
    async fn test_disabled_video_root_does_not_block_images() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("raw-assets/images/logo.png"));
        touch(&root.join("public/videos"));

        let mut runner = runner(test_config(root), RecordingEncoder::new());
        runner.run().await.unwrap();

        assert_eq!(runner.state(), BatchState::Done);
        assert_eq!(listing(&root.join("public/images")), ["logo.avif", "logo.jpg", "logo.webp"]);
    }

    #[tokio::test]
    async fn test_stop_signal_fails_batch() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("raw-assets/images/logo.png"));

        let (sender, stop) = StopSignal::channel();
        sender.send(()).unwrap();

        let mut runner =
            runner(test_config(temp_dir.path()), RecordingEncoder::new()).with_stop_signal(stop);
        let err = runner.run().await.unwrap_err();

        assert!(matches!(err.downcast_ref::<ConvertError>(), Some(ConvertError::Cancelled)));
        assert_eq!(runner.state(), BatchState::Failed);
    }
}
