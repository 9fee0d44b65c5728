//! Loaded photo type and the image sources it comes from

use std::path::PathBuf;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};

/// Where a photo comes from. The core only reads it; it never fetches remotely.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// A file on disk
    Path(PathBuf),
    /// Encoded bytes already in memory (e.g. from an upload)
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Short description for log and error messages
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }

    /// Read and decode on the blocking pool
    pub async fn load(self) -> Result<SourceImage> {
        tokio::task::spawn_blocking(move || self.load_blocking())
            .await
            .map_err(|e| Error::Input(format!("loader task failed: {e}")))?
    }

    pub fn load_blocking(self) -> Result<SourceImage> {
        let name = self.describe();
        let bytes = match self {
            ImageSource::Path(path) => {
                std::fs::read(&path).map_err(|e| Error::Input(format!("{name}: {e}")))?
            }
            ImageSource::Bytes(bytes) => bytes,
        };
        SourceImage::decode(bytes).map_err(|e| match e {
            Error::Input(msg) => Error::Input(format!("{name}: {msg}")),
            other => other,
        })
    }
}

/// A decoded photo together with its original encoded bytes
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub rgba: Arc<RgbaImage>,
    /// Bytes as loaded, handed unchanged to the analysis delegate
    pub encoded: Arc<Vec<u8>>,
    pub format: ImageFormat,
}

impl SourceImage {
    /// Decode encoded image bytes
    pub fn decode(encoded: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&encoded)
            .map_err(|_| Error::Input("unrecognized image format".to_string()))?;
        let rgba = image::load_from_memory_with_format(&encoded, format)
            .map_err(|e| Error::Input(e.to_string()))?
            .to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(Error::Input("image has no pixels".to_string()));
        }
        log::debug!(
            "SourceImage decoded: {}x{} pixels ({:?})",
            rgba.width(),
            rgba.height(),
            format
        );
        Ok(Self {
            rgba: Arc::new(rgba),
            encoded: Arc::new(encoded),
            format,
        })
    }

    /// Wrap already-decoded pixels, encoding them as PNG for the delegate
    pub fn from_rgba(rgba: RgbaImage) -> Result<Self> {
        let mut encoded = Vec::new();
        crate::export::write_png(&mut encoded, &rgba).map_err(|e| Error::Encode(e.to_string()))?;
        Ok(Self {
            rgba: Arc::new(rgba),
            encoded: Arc::new(encoded),
            format: ImageFormat::Png,
        })
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}
