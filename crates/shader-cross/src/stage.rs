//! Pipeline stage resolution.
//!
//! A stage is either named explicitly (`vs`, `fs`, ...) or inferred from the extension of
//! the first input file that carries a known one. An explicit token always wins, even when
//! it is unknown: an unknown token resolves to [`Stage::None`] rather than falling back to
//! file extensions.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    /// Unresolved. Never a valid input to the front end.
    #[default]
    None,
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
}

/// Explicit stage tokens accepted by `--stage`.
const STAGE_TOKENS: &[(&str, Stage)] = &[
    ("vs", Stage::Vertex),
    ("tc", Stage::TessControl),
    ("te", Stage::TessEvaluation),
    ("gs", Stage::Geometry),
    ("fs", Stage::Fragment),
    ("cs", Stage::Compute),
];

/// File extensions that imply a stage. The short stage tokens are accepted as extensions too.
const STAGE_EXTENSIONS: &[(&str, Stage)] = &[
    ("vert", Stage::Vertex),
    ("tesc", Stage::TessControl),
    ("tcs", Stage::TessControl),
    ("tese", Stage::TessEvaluation),
    ("tes", Stage::TessEvaluation),
    ("geom", Stage::Geometry),
    ("frag", Stage::Fragment),
    ("comp", Stage::Compute),
];

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Vertex,
        Stage::TessControl,
        Stage::TessEvaluation,
        Stage::Geometry,
        Stage::Fragment,
        Stage::Compute,
    ];

    /// Maps an explicit stage token. Unknown tokens map to [`Stage::None`].
    pub fn from_token(token: &str) -> Stage {
        lookup(STAGE_TOKENS, token)
    }

    /// Maps a file extension (without the leading dot).
    pub fn from_extension(ext: &str) -> Stage {
        match lookup(STAGE_EXTENSIONS, ext) {
            Stage::None => lookup(STAGE_TOKENS, ext),
            stage => stage,
        }
    }

    /// Infers the stage from a file name's extension.
    pub fn from_filename(filename: &str) -> Stage {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Stage::from_extension)
            .unwrap_or(Stage::None)
    }

    pub fn token(self) -> Option<&'static str> {
        STAGE_TOKENS
            .iter()
            .find(|(_, stage)| *stage == self)
            .map(|(token, _)| *token)
    }

    pub fn is_none(self) -> bool {
        self == Stage::None
    }

    /// The equivalent naga stage, if the naga GLSL front end supports this stage.
    pub(crate) fn to_naga(self) -> Option<naga::ShaderStage> {
        match self {
            Stage::Vertex => Some(naga::ShaderStage::Vertex),
            Stage::Fragment => Some(naga::ShaderStage::Fragment),
            Stage::Compute => Some(naga::ShaderStage::Compute),
            Stage::None | Stage::TessControl | Stage::TessEvaluation | Stage::Geometry => None,
        }
    }

    pub(crate) fn from_naga(stage: naga::ShaderStage) -> Stage {
        match stage {
            naga::ShaderStage::Vertex => Stage::Vertex,
            naga::ShaderStage::Fragment => Stage::Fragment,
            naga::ShaderStage::Compute => Stage::Compute,
            #[allow(unreachable_patterns)]
            _ => Stage::None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::None => "none",
            Stage::Vertex => "vertex",
            Stage::TessControl => "tessellation control",
            Stage::TessEvaluation => "tessellation evaluation",
            Stage::Geometry => "geometry",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
        };
        f.write_str(name)
    }
}

fn lookup(table: &[(&str, Stage)], key: &str) -> Stage {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, stage)| *stage)
        .unwrap_or(Stage::None)
}

/// Resolves the pipeline stage.
///
/// A non-empty `explicit_token` is looked up in the token table and decides the result on
/// its own. Otherwise `filenames` are scanned in order and the first one with a known
/// extension decides. Returns [`Stage::None`] when nothing matches; callers must treat that
/// as a usage error before invoking the front end.
pub fn resolve<S: AsRef<str>>(explicit_token: &str, filenames: &[S]) -> Stage {
    if !explicit_token.is_empty() {
        return Stage::from_token(explicit_token);
    }
    filenames
        .iter()
        .map(|name| Stage::from_filename(name.as_ref()))
        .find(|stage| !stage.is_none())
        .unwrap_or(Stage::None)
}
