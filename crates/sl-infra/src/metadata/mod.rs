//! Metadata embedded in screenshot files.

pub mod embedded_parser;
mod embedded_reader;

pub use embedded_parser::{parse_embedded, EmbeddedMetadata, ParseOutcome, METADATA_FIELD, PRODUCER};
pub use embedded_reader::{EmbeddedMetadataReader, DEFAULT_PREFIX_BYTES};

#[cfg(test)]
pub(crate) mod test_support {
    /// A 2x1 PNG carrying one `tEXt` chunk, encoded with the `png` crate.
    pub fn png_with_text(keyword: &str, text: &str) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 1);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            encoder
                .add_text_chunk(keyword.to_string(), text.to_string())
                .unwrap();
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0u8; 6]).unwrap();
        }
        out
    }
}
