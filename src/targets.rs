//! # Output Targets Module
//!
//! Tabelle dichiarative dei target di conversione.
//!
//! ## Responsabilità:
//! - Definisce i formati immagine (`ImageFormat`) e i target immagine (`ImageTarget`)
//! - Definisce i profili video (`VideoTarget`) con codec e opzioni FFmpeg
//! - Espone le tabelle fisse `IMAGE_TARGETS` e `VIDEO_TARGETS`
//!
//! Le pipeline consumano queste tabelle con un unico loop generico:
//! aggiungere un target non richiede di toccare la logica di pipeline.
//!
//! ## Target immagine:
//! | Formato | Qualità | Estensione |
//! |---------|---------|------------|
//! | WebP    | 80      | `.webp`    |
//! | AVIF    | 60      | `.avif`    |
//! | JPEG    | 85      | `.jpg`     |
//!
//! ## Target video:
//! | Container | Video      | Audio   | Opzioni                    |
//! |-----------|------------|---------|----------------------------|
//! | WebM      | libvpx-vp9 | libopus | `-crf 30 -b:v 0`           |
//! | MP4       | libx264    | aac     | `-crf 28 -preset veryfast` |

use anyhow::Result;
use std::fmt;
use std::path::Path;

/// A single encode job description for one input file.
pub trait OutputTarget: fmt::Display {
    /// File extension (without the dot) of the produced output
    fn extension(&self) -> &'static str;
}

/// External codec collaborator: encodes `input` into `output` for one target.
///
/// The returned future resolves only once the output is fully written
/// (or the encode failed), so callers can sequence targets by awaiting it.
#[allow(async_fn_in_trait)]
pub trait Encoder<T: OutputTarget> {
    async fn encode(&self, input: &Path, target: &T, output: &Path) -> Result<()>;
}

/// Image output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    WebP,
    Avif,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Avif => "avif",
            Self::Jpeg => "jpg",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WebP => "WebP",
            Self::Avif => "AVIF",
            Self::Jpeg => "JPEG",
        }
    }
}

/// Image target: format plus quality (0-100, higher = better/larger)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTarget {
    pub format: ImageFormat,
    pub quality: u8,
}

impl OutputTarget for ImageTarget {
    fn extension(&self) -> &'static str {
        self.format.extension()
    }
}

impl fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} q{}", self.format.name(), self.quality)
    }
}

/// Video target: container extension, codec pair and extra encoder flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTarget {
    pub extension: &'static str,
    pub video_codec: &'static str,
    pub audio_codec: &'static str,
    /// Extra FFmpeg output options, already split into argv tokens
    pub options: &'static [&'static str],
}

impl OutputTarget for VideoTarget {
    fn extension(&self) -> &'static str {
        self.extension
    }
}

impl fmt::Display for VideoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{} {})",
            self.extension,
            self.video_codec,
            self.audio_codec,
            self.options.join(" ")
        )
    }
}

pub const IMAGE_TARGETS: [ImageTarget; 3] = [
    ImageTarget {
        format: ImageFormat::WebP,
        quality: 80,
    },
    ImageTarget {
        format: ImageFormat::Avif,
        quality: 60,
    },
    ImageTarget {
        format: ImageFormat::Jpeg,
        quality: 85,
    },
];

pub const VIDEO_TARGETS: [VideoTarget; 2] = [
    VideoTarget {
        extension: "webm",
        video_codec: "libvpx-vp9",
        audio_codec: "libopus",
        options: &["-crf", "30", "-b:v", "0"],
    },
    VideoTarget {
        extension: "mp4",
        video_codec: "libx264",
        audio_codec: "aac",
        options: &["-crf", "28", "-preset", "veryfast"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_targets_table() {
        let exts: Vec<_> = IMAGE_TARGETS.iter().map(|t| t.extension()).collect();
        assert_eq!(exts, ["webp", "avif", "jpg"]);

        let qualities: Vec<_> = IMAGE_TARGETS.iter().map(|t| t.quality).collect();
        assert_eq!(qualities, [80, 60, 85]);
    }

    #[test]
    fn test_video_targets_table() {
        let webm = &VIDEO_TARGETS[0];
        assert_eq!(webm.extension(), "webm");
        assert_eq!((webm.video_codec, webm.audio_codec), ("libvpx-vp9", "libopus"));
        assert_eq!(webm.options, ["-crf", "30", "-b:v", "0"]);

        let mp4 = &VIDEO_TARGETS[1];
        assert_eq!(mp4.extension(), "mp4");
        assert_eq!((mp4.video_codec, mp4.audio_codec), ("libx264", "aac"));
        assert_eq!(mp4.options, ["-crf", "28", "-preset", "veryfast"]);
    }

    #[test]
    fn test_target_display() {
        assert_eq!(IMAGE_TARGETS[1].to_string(), "AVIF q60");
        assert_eq!(VIDEO_TARGETS[1].to_string(), "mp4 (libx264/aac -crf 28 -preset veryfast)");
    }
}
