//! Version codecs.
//!
//! Users pass versions as plain decimal integers (`13` for SPIR-V 1.3, `60` for HLSL shader
//! model 6.0, `201` for MSL 2.0.1). Each collaborator wants a different encoding. A value of
//! `0` always means "unset": every codec returns `None` for it and the collaborator keeps its
//! own compiled-in default.

use std::fmt;

use crate::error::UsageError;

/// The canonical default table. Option structs' `Default` impls read from here and nowhere
/// else.
pub mod defaults {
    /// `#version` assumed by the front end when the source has none.
    pub const FRONT_END_VERSION: u32 = 450;
    pub const ENTRY_POINT: &str = "main";
    /// SPIR-V 1.3.
    pub const SPIRV_VERSION: u32 = 13;
    pub const GLSL_VERSION: u32 = 450;
    pub const ESSL_VERSION: u32 = 320;
    /// Shader model 6.0.
    pub const HLSL_SHADER_MODEL: u32 = 60;
    /// MSL 1.2.0.
    pub const MSL_VERSION: u32 = 120;
}

/// Encodes a two-digit SPIR-V version (`13` meaning 1.3) into the header version word
/// (`0x0001_0300`).
pub fn spirv_version_word(version: u32) -> Option<u32> {
    if version == 0 {
        return None;
    }
    Some(((version / 10) << 16) | ((version % 10) << 8))
}

/// Splits a SPIR-V header version word into `(major, minor)`.
pub fn spirv_word_to_pair(word: u32) -> (u8, u8) {
    (((word >> 16) & 0xff) as u8, ((word >> 8) & 0xff) as u8)
}

/// HLSL shader models and GLSL versions are passed through untouched.
pub fn passthrough(version: u32) -> Option<u32> {
    (version != 0).then_some(version)
}

/// An MSL language version, decomposed from the packed `MajorMinorPatch` decimal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MslVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl MslVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// `201` decomposes to 2.0.1, `120` to 1.2.0.
    pub fn from_packed(version: u32) -> Option<Self> {
        if version == 0 {
            return None;
        }
        Some(Self {
            major: version / 100,
            minor: (version / 10) % 10,
            patch: version % 10,
        })
    }
}

impl fmt::Display for MslVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parses a `--version` flag. An empty string means unset (`0`).
pub fn parse_version_flag(raw: &str) -> Result<u32, UsageError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>()
        .map_err(|_| UsageError::InvalidVersion(raw.to_owned()))
}
