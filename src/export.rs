//! Export of the composed view as a downloadable image
//!
//! Export renders the composition at a quality multiplier over a dark
//! background, stamps the watermark, encodes at maximum quality and hands the
//! bytes to a [`DownloadSink`]. Nothing is written unless every step succeeds.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::capture::{Composition, Compositor};
use crate::domain::HexColor;
use crate::error::{Error, Result};
use crate::render::watermark::draw_watermark_on_image;

/// Output pixels per logical pixel
pub const DEFAULT_QUALITY_SCALE: f32 = 3.0;
/// Fill behind transparent or uncovered areas
pub const DEFAULT_BACKGROUND: HexColor = HexColor::rgb(0x11, 0x11, 0x11);
pub const DEFAULT_WATERMARK: &str = "Watch QC";

/// Encoded file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless
    #[default]
    Png,
    /// Quality 100
    Jpeg,
}

impl ExportFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

/// Export settings that outlive a single request
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    pub background: HexColor,
    pub quality_scale: f32,
    pub watermark: String,
    pub format: ExportFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            quality_scale: DEFAULT_QUALITY_SCALE,
            watermark: DEFAULT_WATERMARK.to_string(),
            format: ExportFormat::default(),
        }
    }
}

/// One-shot description of an export
#[derive(Clone, Debug)]
pub struct ExportRequest {
    pub composition: Composition,
    pub background: HexColor,
    pub quality_scale: f32,
    pub watermark: String,
    pub format: ExportFormat,
}

impl ExportRequest {
    pub fn new(composition: Composition, options: &ExportOptions) -> Self {
        Self {
            composition,
            background: options.background,
            quality_scale: options.quality_scale,
            watermark: options.watermark.clone(),
            format: options.format,
        }
    }
}

/// A delivered export
#[derive(Clone, Debug, PartialEq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

/// Where finished files go
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` under `file_name`, returning where they ended up.
    /// Must not leave a partial file behind on failure.
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes exports into a directory
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download folder
    pub fn downloads() -> Option<Self> {
        default_download_dir().map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(file_name);

        // Write next to the target, then move into place; the temp file is
        // removed on drop if anything fails before the persist
        let mut file = tempfile::Builder::new()
            .prefix(".watchqc-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.persist_noclobber(&target).map_err(|e| e.error)?;

        log::info!("Export saved to {}", target.display());
        Ok(target)
    }
}

/// Downloads folder, falling back to `$HOME/Downloads`
pub fn default_download_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
}

/// Timestamped file name, unique to the millisecond
pub fn export_file_name(format: ExportFormat, now: chrono::DateTime<chrono::Local>) -> String {
    format!(
        "WatchQC_{}.{}",
        now.format("%Y-%m-%d_%H-%M-%S-%3f"),
        format.extension()
    )
}

pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> std::result::Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Encode at the highest quality the format offers
pub fn encode(image: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        ExportFormat::Png => {
            write_png(&mut buffer, image).map_err(|e| Error::Encode(e.to_string()))?;
        }
        ExportFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, 100);
            encoder
                .encode_image(&rgb)
                .map_err(|e| Error::Encode(e.to_string()))?;
        }
    }
    Ok(buffer)
}

/// Capture the composition and stamp the watermark
pub fn render_export(request: &ExportRequest, compositor: &dyn Compositor) -> Result<RgbaImage> {
    let mut image = compositor.capture(
        &request.composition,
        request.background,
        request.quality_scale,
    )?;
    draw_watermark_on_image(&mut image, &request.watermark);
    Ok(image)
}

/// Run a whole export synchronously
pub fn run_export(
    request: &ExportRequest,
    compositor: &dyn Compositor,
    sink: &dyn DownloadSink,
) -> Result<ExportArtifact> {
    let image = render_export(request, compositor)?;
    let bytes = encode(&image, request.format)?;
    let name = export_file_name(request.format, chrono::Local::now());
    let path = sink.deliver(&name, &bytes)?;
    Ok(ExportArtifact {
        path,
        width: image.width(),
        height: image.height(),
        byte_len: bytes.len(),
    })
}

/// Run an export on the blocking pool
pub async fn run_export_blocking(
    request: ExportRequest,
    compositor: Arc<dyn Compositor>,
    sink: Arc<dyn DownloadSink>,
) -> Result<ExportArtifact> {
    tokio::task::spawn_blocking(move || run_export(&request, compositor.as_ref(), sink.as_ref()))
        .await
        .map_err(|e| Error::Capture(format!("export task failed: {e}")))?
}
