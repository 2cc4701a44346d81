use std::path::PathBuf;

use thiserror::Error;

use crate::backend::Dialect;

/// Problems with the request itself. Reported before any pipeline phase runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("unknown stage (pass --stage or use a .vert/.frag/.comp/... input)")]
    UnresolvedStage,
    #[error("unsupported source language `{0}` (expected glsl or spirv)")]
    UnknownSourceLanguage(String),
    #[error("unsupported target language `{0}` (expected spirv, glsl, essl, hlsl or msl)")]
    UnknownTargetLanguage(String),
    #[error("invalid version `{0}`")]
    InvalidVersion(String),
    #[error("no input sources")]
    NoInput,
    #[error("SPIR-V input takes exactly one source, got {0}")]
    TooManyBinaryInputs(usize),
    #[error("no program available: {0} requires a successful parse first")]
    NotParsed(&'static str),
}

#[derive(Debug, Error)]
pub enum ShaderCrossError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error("failed to open {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("front end failed: {0}")]
    FrontEnd(String),
    #[error("SPIR-V encoding failed: {0}")]
    Encode(String),
    #[error("SPIR-V decode failed: {0}")]
    Decode(String),
    #[error("{dialect} emission failed: {message}")]
    Backend { dialect: Dialect, message: String },
}

impl ShaderCrossError {
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}
