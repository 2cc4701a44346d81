//! Structural checks run on a SPIR-V word stream before it reaches the decoder.

use std::fmt;

pub const MAGIC: u32 = 0x0723_0203;
pub const HEADER_WORDS: usize = 5;
/// Highest SPIR-V 1.x minor version accepted.
pub const MAX_MINOR_VERSION: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderError {
    pub word_index: usize,
    pub message: String,
}

impl HeaderError {
    fn new(word_index: usize, message: impl Into<String>) -> Self {
        Self {
            word_index,
            message: message.into(),
        }
    }
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at word {}: {}", self.word_index, self.message)
    }
}

impl std::error::Error for HeaderError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpirvHeader {
    pub major: u8,
    pub minor: u8,
    pub generator: u32,
    pub bound: u32,
}

impl SpirvHeader {
    pub fn version_word(&self) -> u32 {
        (u32::from(self.major) << 16) | (u32::from(self.minor) << 8)
    }
}

/// Validates the module header and walks the instruction stream, checking that every
/// instruction's word count is non-zero and fits in what is left of the stream.
pub fn check(words: &[u32]) -> Result<SpirvHeader, HeaderError> {
    if words.len() < HEADER_WORDS {
        return Err(HeaderError::new(
            words.len(),
            format!(
                "stream too short: need at least {HEADER_WORDS} header words, got {}",
                words.len()
            ),
        ));
    }

    let magic = words[0];
    if magic == MAGIC.swap_bytes() {
        return Err(HeaderError::new(
            0,
            "byte-swapped magic number (big-endian SPIR-V is not supported)",
        ));
    }
    if magic != MAGIC {
        return Err(HeaderError::new(
            0,
            format!("bad magic {magic:#010x}, expected {MAGIC:#010x}"),
        ));
    }

    let version = words[1];
    let major = ((version >> 16) & 0xff) as u8;
    let minor = ((version >> 8) & 0xff) as u8;
    if version & 0xff00_00ff != 0 || major != 1 || minor > MAX_MINOR_VERSION {
        return Err(HeaderError::new(
            1,
            format!("unsupported version word {version:#010x}"),
        ));
    }

    let generator = words[2];
    let bound = words[3];
    if bound == 0 {
        return Err(HeaderError::new(3, "id bound must be non-zero"));
    }
    if words[4] != 0 {
        return Err(HeaderError::new(
            4,
            format!("reserved schema word must be 0, got {:#x}", words[4]),
        ));
    }

    let mut index = HEADER_WORDS;
    while index < words.len() {
        let word = words[index];
        let count = (word >> 16) as usize;
        let opcode = word & 0xffff;
        if count == 0 {
            return Err(HeaderError::new(
                index,
                format!("instruction (opcode {opcode}) has a word count of 0"),
            ));
        }
        let remaining = words.len() - index;
        if count > remaining {
            return Err(HeaderError::new(
                index,
                format!(
                    "truncated instruction stream: opcode {opcode} needs {count} words, {remaining} remain"
                ),
            ));
        }
        index += count;
    }

    Ok(SpirvHeader {
        major,
        minor,
        generator,
        bound,
    })
}
