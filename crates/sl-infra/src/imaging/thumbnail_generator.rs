use std::io::Cursor;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};

use sl_core::ports::{GeneratedThumbnail, ThumbnailGeneratorPort};

use super::transform::target_size;

/// Single-step resize + re-encode. Keeps the source container format so a
/// cached preview has the same extension as its source; formats without an
/// encoder here fall back to JPEG.
pub struct ImageThumbnailGenerator;

impl ImageThumbnailGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageThumbnailGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThumbnailGeneratorPort for ImageThumbnailGenerator {
    async fn generate(&self, source: Vec<u8>, size: u32) -> Result<GeneratedThumbnail> {
        tokio::task::spawn_blocking(move || generate_blocking(&source, size))
            .await
            .context("thumbnail worker")?
    }
}

fn generate_blocking(source: &[u8], size: u32) -> Result<GeneratedThumbnail> {
    let format = image::guess_format(source).context("detect thumbnail source format")?;
    let decoded = image::load_from_memory_with_format(source, format)
        .context("decode image bytes for thumbnail")?;
    let (original_width, original_height) = decoded.dimensions();
    let (target_width, target_height) = target_size(original_width, original_height, size.max(1));

    let resized = if target_width == original_width && target_height == original_height {
        decoded
    } else {
        decoded.resize_exact(target_width, target_height, FilterType::Triangle)
    };

    let output_format = match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP => format,
        _ => ImageFormat::Jpeg,
    };
    let encodable = match output_format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        ImageFormat::WebP => DynamicImage::ImageRgba8(resized.to_rgba8()),
        _ => resized,
    };

    let mut bytes = Vec::new();
    encodable
        .write_to(&mut Cursor::new(&mut bytes), output_format)
        .with_context(|| format!("encode thumbnail as {output_format:?}"))?;

    Ok(GeneratedThumbnail {
        bytes,
        width: encodable.width(),
        height: encodable.height(),
    })
}
