mod chunk_text;

pub use chunk_text::{ChunkTextExtractor, DEFAULT_MAX_CHUNKS, PNG_SIGNATURE};
