//! Dialect back ends.
//!
//! Each dialect is a variant of [`DialectOptions`] with one emission function behind it. The
//! functions only read the [`DecodedIr`], so the same decoded module can be emitted any
//! number of times, in any order.

mod glsl;
mod hlsl;
mod msl;

use std::fmt;

use crate::diagnostics::{Diagnostics, Phase};
use crate::error::ShaderCrossError;
use crate::spirv::DecodedIr;
use crate::version::{defaults, MslVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Glsl,
    Essl,
    Hlsl,
    Msl,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [Dialect::Glsl, Dialect::Essl, Dialect::Hlsl, Dialect::Msl];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Glsl => "glsl",
            Dialect::Essl => "essl",
            Dialect::Hlsl => "hlsl",
            Dialect::Msl => "msl",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Desktop GLSL output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlslOptions {
    /// `#version` of the output, e.g. `450`. `0` keeps the writer's default.
    pub version: u32,
    /// Entry point to emit. Defaults to the module's first entry point.
    pub entry_point: Option<String>,
}

impl Default for GlslOptions {
    fn default() -> Self {
        Self {
            version: defaults::GLSL_VERSION,
            entry_point: None,
        }
    }
}

/// OpenGL ES GLSL output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsslOptions {
    pub version: u32,
    pub entry_point: Option<String>,
}

impl Default for EsslOptions {
    fn default() -> Self {
        Self {
            version: defaults::ESSL_VERSION,
            entry_point: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HlslOptions {
    /// Shader model as two digits, `60` meaning 6.0.
    pub shader_model: u32,
}

impl Default for HlslOptions {
    fn default() -> Self {
        Self {
            shader_model: defaults::HLSL_SHADER_MODEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MslPlatform {
    Ios,
    #[default]
    MacOs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MslOptions {
    pub platform: MslPlatform,
    /// `None` keeps the writer's default language version.
    pub version: Option<MslVersion>,
}

impl MslOptions {
    /// Builds options from a packed `MajorMinorPatch` version such as `201`.
    pub fn with_packed_version(platform: MslPlatform, packed: u32) -> Self {
        Self {
            platform,
            version: MslVersion::from_packed(packed),
        }
    }
}

impl Default for MslOptions {
    fn default() -> Self {
        Self::with_packed_version(MslPlatform::default(), defaults::MSL_VERSION)
    }
}

/// Options for exactly one target dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialectOptions {
    Glsl(GlslOptions),
    Essl(EsslOptions),
    Hlsl(HlslOptions),
    Msl(MslOptions),
}

impl DialectOptions {
    /// Options for `dialect` with the user-facing `version` applied. `0` selects the
    /// dialect's defaults.
    pub fn with_version(dialect: Dialect, version: u32) -> Self {
        match (dialect, version) {
            (Dialect::Glsl, 0) => Self::Glsl(GlslOptions::default()),
            (Dialect::Glsl, version) => Self::Glsl(GlslOptions {
                version,
                ..GlslOptions::default()
            }),
            (Dialect::Essl, 0) => Self::Essl(EsslOptions::default()),
            (Dialect::Essl, version) => Self::Essl(EsslOptions {
                version,
                ..EsslOptions::default()
            }),
            (Dialect::Hlsl, 0) => Self::Hlsl(HlslOptions::default()),
            (Dialect::Hlsl, shader_model) => Self::Hlsl(HlslOptions { shader_model }),
            (Dialect::Msl, 0) => Self::Msl(MslOptions::default()),
            (Dialect::Msl, packed) => {
                Self::Msl(MslOptions::with_packed_version(MslPlatform::default(), packed))
            }
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Glsl(_) => Dialect::Glsl,
            Self::Essl(_) => Dialect::Essl,
            Self::Hlsl(_) => Dialect::Hlsl,
            Self::Msl(_) => Dialect::Msl,
        }
    }

    pub(crate) fn operation_name(&self) -> &'static str {
        match self {
            Self::Glsl(_) => "to_glsl",
            Self::Essl(_) => "to_essl",
            Self::Hlsl(_) => "to_hlsl",
            Self::Msl(_) => "to_msl",
        }
    }

    pub(crate) fn emit(
        &self,
        ir: &DecodedIr,
        log: &mut Diagnostics,
    ) -> Result<String, ShaderCrossError> {
        let dialect = self.dialect();
        let result = match self {
            Self::Glsl(options) => glsl::emit_desktop(ir, options),
            Self::Essl(options) => glsl::emit_embedded(ir, options),
            Self::Hlsl(options) => hlsl::emit(ir, options),
            Self::Msl(options) => msl::emit(ir, options, log),
        };
        match result {
            Ok(text) => {
                tracing::debug!(%dialect, bytes = text.len(), "emitted shader source");
                Ok(text)
            }
            Err(message) => {
                log.error(Phase::Emit(dialect), message.clone());
                Err(ShaderCrossError::Backend { dialect, message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_version_selects_defaults() {
        assert_eq!(
            DialectOptions::with_version(Dialect::Glsl, 0),
            DialectOptions::Glsl(GlslOptions {
                version: 450,
                entry_point: None
            })
        );
        assert_eq!(
            DialectOptions::with_version(Dialect::Essl, 0),
            DialectOptions::Essl(EsslOptions {
                version: 320,
                entry_point: None
            })
        );
        assert_eq!(
            DialectOptions::with_version(Dialect::Hlsl, 0),
            DialectOptions::Hlsl(HlslOptions { shader_model: 60 })
        );
        assert_eq!(
            DialectOptions::with_version(Dialect::Msl, 0),
            DialectOptions::Msl(MslOptions {
                platform: MslPlatform::MacOs,
                version: Some(MslVersion::new(1, 2, 0)),
            })
        );
    }

    #[test]
    fn explicit_versions_are_applied() {
        assert_eq!(
            DialectOptions::with_version(Dialect::Hlsl, 51),
            DialectOptions::Hlsl(HlslOptions { shader_model: 51 })
        );
        let DialectOptions::Msl(msl) = DialectOptions::with_version(Dialect::Msl, 201) else {
            panic!("expected MSL options");
        };
        assert_eq!(msl.version, Some(MslVersion::new(2, 0, 1)));
    }

    #[test]
    fn dialect_round_trips_through_options() {
        for dialect in Dialect::ALL {
            assert_eq!(DialectOptions::with_version(dialect, 0).dialect(), dialect);
        }
    }
}
