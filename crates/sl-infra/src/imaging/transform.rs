//! Upload transform: decode → aspect check → resize → lossy encode.

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use sl_core::ports::{ImageTransformPort, TransformError, TransformedImage};

/// Neither edge of an upload exceeds this.
pub const MAX_EDGE: u32 = 1080;

/// Allowed deviation of `width / height` from 16:9 or 9:16.
pub const ASPECT_TOLERANCE: f64 = 0.01;

pub const JPEG_QUALITY: u8 = 85;

#[cfg(feature = "avif")]
pub const AVIF_QUALITY: u8 = 80;

const ACCEPTED_RATIOS: [f64; 2] = [16.0 / 9.0, 9.0 / 16.0];

#[derive(Debug, Clone, Copy)]
pub struct TransformSettings {
    pub max_edge: u32,
    pub aspect_tolerance: f64,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            max_edge: MAX_EDGE,
            aspect_tolerance: ASPECT_TOLERANCE,
        }
    }
}

/// Runs the transform on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct ImageTransformPipeline {
    settings: TransformSettings,
}

impl ImageTransformPipeline {
    pub fn new(settings: TransformSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ImageTransformPort for ImageTransformPipeline {
    async fn process(&self, raw: Vec<u8>) -> Result<TransformedImage, TransformError> {
        let settings = self.settings;
        tokio::task::spawn_blocking(move || transform(&settings, &raw))
            .await
            .map_err(|e| TransformError::Worker(e.to_string()))?
    }
}

/// The synchronous pipeline. Each step aborts on failure.
pub fn transform(settings: &TransformSettings, raw: &[u8]) -> Result<TransformedImage, TransformError> {
    let decoded = image::load_from_memory(raw).map_err(|e| TransformError::Decode(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    validate_aspect_ratio(width, height, settings.aspect_tolerance)?;

    let (target_width, target_height) = target_size(width, height, settings.max_edge);
    let resized = if (target_width, target_height) == (width, height) {
        decoded
    } else {
        debug!(width, height, target_width, target_height, "Resizing upload");
        decoded.resize_exact(target_width, target_height, FilterType::Lanczos3)
    };

    encode(&resized)
}

pub fn validate_aspect_ratio(width: u32, height: u32, tolerance: f64) -> Result<(), TransformError> {
    let ratio = if height == 0 {
        f64::INFINITY
    } else {
        width as f64 / height as f64
    };
    if ACCEPTED_RATIOS
        .iter()
        .any(|accepted| (ratio - accepted).abs() <= tolerance)
    {
        Ok(())
    } else {
        Err(TransformError::UnsupportedAspectRatio {
            width,
            height,
            ratio,
        })
    }
}

/// Scale the long edge down to `max_edge` when either edge exceeds it.
pub fn target_size(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    if width >= height {
        let scaled_height = ((height as f64) * (max_edge as f64) / (width as f64)).round() as u32;
        (max_edge, scaled_height.max(1))
    } else {
        let scaled_width = ((width as f64) * (max_edge as f64) / (height as f64)).round() as u32;
        (scaled_width.max(1), max_edge)
    }
}

#[cfg(not(feature = "avif"))]
fn encode(image: &DynamicImage) -> Result<TransformedImage, TransformError> {
    use image::codecs::jpeg::JpegEncoder;

    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| TransformError::Encode(e.to_string()))?;

    Ok(TransformedImage {
        bytes,
        width,
        height,
        mime_type: "image/jpeg",
    })
}

#[cfg(feature = "avif")]
fn encode(image: &DynamicImage) -> Result<TransformedImage, TransformError> {
    use image::codecs::avif::AvifEncoder;
    use image::ImageEncoder;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut bytes = Vec::new();
    // Speed 1: slowest preset, smallest output.
    AvifEncoder::new_with_speed_quality(&mut bytes, 1, AVIF_QUALITY)
        .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| TransformError::Encode(e.to_string()))?;

    Ok(TransformedImage {
        bytes,
        width,
        height,
        mime_type: "image/avif",
    })
}
