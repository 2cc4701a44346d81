//! SPIR-V: encoding programs into words, validating and decoding word streams, and the
//! on-disk/terminal representations of those words.

mod encode;
pub mod header;
mod ir;
pub mod words;

pub(crate) use self::encode::encode;
pub use self::header::SpirvHeader;
pub use self::ir::{DecodedIr, SpirvIr};

use crate::version::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpirvOptions {
    /// Two-digit SPIR-V version, `13` meaning 1.3. `0` keeps the encoder's default.
    pub version: u32,
}

impl SpirvOptions {
    pub fn with_version(version: u32) -> Self {
        Self { version }
    }
}

impl Default for SpirvOptions {
    fn default() -> Self {
        Self {
            version: defaults::SPIRV_VERSION,
        }
    }
}
