//! Image decoding, policy checks and re-encoding.

mod thumbnail_generator;
pub mod transform;

pub use thumbnail_generator::ImageThumbnailGenerator;
pub use transform::{ImageTransformPipeline, TransformSettings};
