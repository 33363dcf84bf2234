//! # Conversion Pipeline
//!
//! Loop generico "applica tutti i target a tutti i file" condiviso
//! dalla pipeline immagini e dalla pipeline video.
//!
//! ## Flusso per ogni file:
//! 1. Calcola identità relativa e directory speculare (creandola)
//! 2. Per ogni target della tabella, in ordine:
//!    - controlla lo stop signal
//!    - codifica in un file temporaneo nella directory di output
//!    - attende il completamento dell'encoder (in corsa con lo stop signal)
//!    - rinomina il temporaneo in `<base>.<ext>`
//! 3. Aggiorna statistiche e progress bar
//!
//! ## Gestione errori:
//! - `FailFast`: il primo errore interrompe la pipeline (comportamento di default)
//! - `KeepGoing`: l'errore viene loggato e contato, si passa al file successivo
//! - La cancellazione interrompe sempre, qualunque sia la policy
//!
//! Una root di input assente non è un errore: la pipeline viene saltata
//! senza creare nulla in output.

use crate::{
    config::{AssetRoot, FailurePolicy},
    converter::path_resolver::PathResolver,
    error::ConvertError,
    file_manager::FileManager,
    progress::{ConversionStats, ProgressManager},
    targets::{Encoder, ImageTarget, OutputTarget, VideoTarget, IMAGE_TARGETS, VIDEO_TARGETS},
};
use anyhow::Result;
use std::path::Path;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Batch-wide cancellation signal backed by a broadcast channel.
///
/// A dropped sender never counts as a stop request.
pub struct StopSignal {
    receiver: Option<broadcast::Receiver<()>>,
}

impl StopSignal {
    /// A signal that never fires
    pub fn none() -> Self {
        Self { receiver: None }
    }

    pub fn new(receiver: broadcast::Receiver<()>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Creates a sender together with the signal it controls
    pub fn channel() -> (broadcast::Sender<()>, Self) {
        let (sender, receiver) = broadcast::channel(1);
        (sender, Self::new(receiver))
    }

    /// Non-blocking check for a pending stop request
    pub fn should_stop(&mut self) -> bool {
        let Some(receiver) = self.receiver.as_mut() else {
            return false;
        };

        match receiver.try_recv() {
            Ok(()) => true,
            Err(broadcast::error::TryRecvError::Empty) => false,
            // Signal was sent but we missed it, treat as stop
            Err(broadcast::error::TryRecvError::Lagged(_)) => true,
            Err(broadcast::error::TryRecvError::Closed) => {
                self.receiver = None;
                false
            }
        }
    }

    /// Resolves when a stop is requested; pends forever otherwise
    pub async fn stopped(&mut self) {
        if let Some(receiver) = self.receiver.as_mut() {
            match receiver.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => return,
                Err(broadcast::error::RecvError::Closed) => {}
            }
        }
        self.receiver = None;
        std::future::pending::<()>().await
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// "image" or "video"
    pub kind: &'static str,
    /// Input root did not exist, nothing was done
    pub skipped: bool,
    pub stats: ConversionStats,
    /// First error seen in keep-going mode
    pub first_error: Option<String>,
}

impl PipelineReport {
    fn skipped(kind: &'static str) -> Self {
        Self {
            kind,
            skipped: true,
            ..Default::default()
        }
    }
}

/// Sequential conversion of every file under an asset root into every target
pub struct ConversionPipeline<'a, T: OutputTarget, E: Encoder<T>> {
    kind: &'static str,
    targets: &'a [T],
    encoder: &'a E,
    failure_policy: FailurePolicy,
    show_progress: bool,
}

impl<'a, E: Encoder<ImageTarget>> ConversionPipeline<'a, ImageTarget, E> {
    /// Pipeline over the fixed image targets (WebP, AVIF, JPEG)
    pub fn images(encoder: &'a E) -> Self {
        Self::new("image", &IMAGE_TARGETS, encoder)
    }
}

impl<'a, E: Encoder<VideoTarget>> ConversionPipeline<'a, VideoTarget, E> {
    /// Pipeline over the fixed video targets (WebM, MP4)
    pub fn videos(encoder: &'a E) -> Self {
        Self::new("video", &VIDEO_TARGETS, encoder)
    }
}

impl<'a, T: OutputTarget, E: Encoder<T>> ConversionPipeline<'a, T, E> {
    pub fn new(kind: &'static str, targets: &'a [T], encoder: &'a E) -> Self {
        Self {
            kind,
            targets,
            encoder,
            failure_policy: FailurePolicy::FailFast,
            show_progress: false,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Converts every file under `root.input` into `root.output`
    pub async fn run(&self, root: &AssetRoot, stop: &mut StopSignal) -> Result<PipelineReport> {
        if !root.input.exists() {
            debug!("No {} input directory at {}, skipping", self.kind, root.input.display());
            return Ok(PipelineReport::skipped(self.kind));
        }

        let input_root = std::path::absolute(&root.input)
            .map_err(|e| ConvertError::filesystem(&root.input, e))?;
        let output_root = std::path::absolute(&root.output)
            .map_err(|e| ConvertError::filesystem(&root.output, e))?;

        let files = FileManager::list_files(&input_root)?;
        info!("Found {} {} files in {}", files.len(), self.kind, input_root.display());

        let progress = ProgressManager::new(files.len() as u64, self.show_progress);
        let mut report = PipelineReport {
            kind: self.kind,
            ..Default::default()
        };

        for file in &files {
            let result = self
                .convert_file(&input_root, &output_root, file, &progress, &mut report.stats, stop)
                .await;

            if let Err(e) = result {
                let cancelled =
                    matches!(e.downcast_ref::<ConvertError>(), Some(ConvertError::Cancelled));
                if cancelled || self.failure_policy == FailurePolicy::FailFast {
                    progress.finish();
                    return Err(e);
                }

                error!("❌ Failed to convert {} {}: {:#}", self.kind, file.display(), e);
                report.stats.add_failed();
                report
                    .first_error
                    .get_or_insert_with(|| format!("{}: {:#}", file.display(), e));
            }
            progress.inc();
        }

        progress.finish();
        info!("{} pipeline: {}", self.kind, report.stats.format_summary());
        Ok(report)
    }

    async fn convert_file(
        &self,
        input_root: &Path,
        output_root: &Path,
        file: &Path,
        progress: &ProgressManager,
        stats: &mut ConversionStats,
        stop: &mut StopSignal,
    ) -> Result<()> {
        let identity = PathResolver::relative_identity(input_root, file)?;
        let output_dir = PathResolver::ensure_mirrored_dir(input_root, output_root, file).await?;

        info!("Processing {}: {}", self.kind, identity.relative_path.display());
        progress.set_message(&identity.relative_path.to_string_lossy());

        for target in self.targets {
            if stop.should_stop() {
                return Err(ConvertError::Cancelled.into());
            }

            let output = identity.output_file(&output_dir, target.extension());
            let size = self.encode_target(file, target, &output_dir, &output, stop).await?;
            stats.add_output(size);
        }

        stats.add_converted();
        Ok(())
    }

    /// Encodes one target through a temporary file, then moves it into place
    async fn encode_target(
        &self,
        input: &Path,
        target: &T,
        output_dir: &Path,
        output: &Path,
        stop: &mut StopSignal,
    ) -> Result<u64> {
        let suffix = format!(".{}", target.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix(".converting-").suffix(&suffix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let temp = builder
            .tempfile_in(output_dir)
            .map_err(|e| ConvertError::filesystem(output_dir, e))?;

        debug!("Encoding {} -> {} ({})", input.display(), output.display(), target);
        tokio::select! {
            result = self.encoder.encode(input, target, temp.path()) => result?,
            _ = stop.stopped() => return Err(ConvertError::Cancelled.into()),
        }

        temp.persist(output)
            .map_err(|e| ConvertError::filesystem(output, e.error))?;

        FileManager::file_size(output).await
    }
}

/// Converts every image under `input_root` into the three image targets
pub async fn convert_images<E: Encoder<ImageTarget>>(
    input_root: &Path,
    output_root: &Path,
    encoder: &E,
) -> Result<PipelineReport> {
    ConversionPipeline::images(encoder)
        .run(&AssetRoot::new(input_root, output_root), &mut StopSignal::none())
        .await
}

/// Converts every video under `input_root` into the two video targets
pub async fn convert_videos<E: Encoder<VideoTarget>>(
    input_root: &Path,
    output_root: &Path,
    encoder: &E,
) -> Result<PipelineReport> {
    ConversionPipeline::videos(encoder)
        .run(&AssetRoot::new(input_root, output_root), &mut StopSignal::none())
        .await
}
