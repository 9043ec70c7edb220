//! Minimal PNG chunk walk that pulls one text field out of a file prefix.
//!
//! Layout: an 8-byte signature followed by chunks of
//! `[u32 BE length][4-byte type][payload][u32 CRC]`. Text chunks always
//! precede the first `IDAT`, so the walk stops there. The CRC is not checked.

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Upper bound on chunks inspected before giving up.
pub const DEFAULT_MAX_CHUNKS: usize = 64;

const TEXT_CHUNK: [u8; 4] = *b"tEXt";
const INTERNATIONAL_TEXT_CHUNK: [u8; 4] = *b"iTXt";
const IMAGE_DATA_CHUNK: [u8; 4] = *b"IDAT";

/// Extracts the text stored under `field` in a `tEXt` or uncompressed `iTXt` chunk.
#[derive(Debug, Clone)]
pub struct ChunkTextExtractor {
    field: Vec<u8>,
    terminal: [u8; 4],
    max_chunks: usize,
}

impl ChunkTextExtractor {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into().into_bytes(),
            terminal: IMAGE_DATA_CHUNK,
            max_chunks: DEFAULT_MAX_CHUNKS,
        }
    }

    pub fn with_terminal(mut self, terminal: [u8; 4]) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Walk `bytes` and return the text of the first matching chunk.
    ///
    /// `bytes` may be a prefix of the file. A missing signature, a truncated
    /// chunk, reaching the terminal chunk or exhausting the chunk budget all
    /// mean "not found".
    pub fn extract(&self, bytes: &[u8]) -> Option<String> {
        if bytes.get(..PNG_SIGNATURE.len())? != PNG_SIGNATURE {
            return None;
        }

        let mut offset = PNG_SIGNATURE.len();
        for _ in 0..self.max_chunks {
            let header = bytes.get(offset..offset.checked_add(8)?)?;
            let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let kind = [header[4], header[5], header[6], header[7]];
            if kind == self.terminal {
                return None;
            }

            let data_start = offset + 8;
            let data_end = data_start.checked_add(length)?;
            let payload = bytes.get(data_start..data_end)?;

            let found = match kind {
                TEXT_CHUNK => self.text_after_field(payload),
                INTERNATIONAL_TEXT_CHUNK => self.international_text_after_field(payload),
                _ => None,
            };
            if found.is_some() {
                return found;
            }

            offset = data_end.checked_add(4)?;
        }
        None
    }

    /// `tEXt`: `keyword NUL text`.
    fn text_after_field(&self, payload: &[u8]) -> Option<String> {
        let rest = self.after_field_nul(payload)?;
        Some(String::from_utf8_lossy(rest).into_owned())
    }

    /// `iTXt`: `keyword NUL flag method language NUL translated NUL text`.
    fn international_text_after_field(&self, payload: &[u8]) -> Option<String> {
        let rest = self.after_field_nul(payload)?;
        let (&compression_flag, rest) = rest.split_first()?;
        if compression_flag != 0 {
            return None;
        }
        let (_method, rest) = rest.split_first()?;
        let rest = skip_past_nul(rest)?;
        let text = skip_past_nul(rest)?;
        Some(String::from_utf8_lossy(text).into_owned())
    }

    fn after_field_nul<'a>(&self, payload: &'a [u8]) -> Option<&'a [u8]> {
        if self.field.is_empty() {
            return None;
        }
        let field_at = find_subslice(payload, &self.field)?;
        skip_past_nul(&payload[field_at + self.field.len()..])
    }
}

fn skip_past_nul(bytes: &[u8]) -> Option<&[u8]> {
    let nul = bytes.iter().position(|&b| b == 0)?;
    Some(&bytes[nul + 1..])
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
