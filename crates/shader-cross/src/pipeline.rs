//! End-to-end translation for the command line.
//!
//! ```text
//! resolve stage -> front end -> encode -+-> target spirv: words
//!                                       +-> decode -> emit(target)
//! spirv input --------------------------+-> target spirv: bytes, untouched
//!                                       +-> decode -> emit(target)
//! ```
//!
//! The first failing phase ends the run; nothing after it executes and no artifact is
//! produced.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::backend::{Dialect, DialectOptions};
use crate::diagnostics::{Diagnostics, Phase};
use crate::error::{ShaderCrossError, UsageError};
use crate::glsl::{GlslAst, ParseOptions, SourceUnit};
use crate::spirv::words::{render_hex, words_from_le_bytes, words_to_le_bytes};
use crate::spirv::{SpirvIr, SpirvOptions};
use crate::stage::{self, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceLanguage {
    #[default]
    Glsl,
    Spirv,
}

impl FromStr for SourceLanguage {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "glsl" => Ok(Self::Glsl),
            "spirv" => Ok(Self::Spirv),
            other => Err(UsageError::UnknownSourceLanguage(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetLanguage {
    #[default]
    Spirv,
    Glsl,
    Essl,
    Hlsl,
    Msl,
}

impl TargetLanguage {
    /// The text dialect for this target; `None` for SPIR-V.
    pub fn dialect(self) -> Option<Dialect> {
        match self {
            Self::Spirv => None,
            Self::Glsl => Some(Dialect::Glsl),
            Self::Essl => Some(Dialect::Essl),
            Self::Hlsl => Some(Dialect::Hlsl),
            Self::Msl => Some(Dialect::Msl),
        }
    }
}

impl FromStr for TargetLanguage {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spirv" => Ok(Self::Spirv),
            "glsl" => Ok(Self::Glsl),
            "essl" => Ok(Self::Essl),
            "hlsl" => Ok(Self::Hlsl),
            "msl" => Ok(Self::Msl),
            other => Err(UsageError::UnknownTargetLanguage(other.to_owned())),
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dialect() {
            Some(dialect) => write!(f, "{dialect}"),
            None => f.write_str("spirv"),
        }
    }
}

/// One input file's name and raw contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Input {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Explicit stage token; empty to infer from input names.
    pub stage: String,
    pub inputs: Vec<Input>,
    pub from: SourceLanguage,
    pub target: TargetLanguage,
    /// Target version; `0` for the target's default.
    pub version: u32,
    pub include_directories: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// SPIR-V produced by the encoder.
    Words(Vec<u32>),
    /// SPIR-V input passed through byte for byte.
    Passthrough(Vec<u8>),
    Text(String),
}

impl Artifact {
    /// Bytes for a regular file: raw little-endian words for SPIR-V.
    pub fn file_bytes(&self) -> Vec<u8> {
        match self {
            Self::Words(words) => words_to_le_bytes(words),
            Self::Passthrough(bytes) => bytes.clone(),
            Self::Text(text) => text.clone().into_bytes(),
        }
    }

    /// Bytes for standard output: SPIR-V is rendered as hex text.
    pub fn stream_bytes(&self) -> Result<Vec<u8>, ShaderCrossError> {
        match self {
            Self::Words(words) => Ok(render_hex(words).into_bytes()),
            Self::Passthrough(bytes) => {
                let words = words_from_le_bytes(bytes).map_err(ShaderCrossError::Decode)?;
                Ok(render_hex(&words).into_bytes())
            }
            Self::Text(text) => Ok(text.clone().into_bytes()),
        }
    }
}

/// Runs `request` through the pipeline, appending every phase's messages to `log`.
pub fn translate(request: &Request, log: &mut Diagnostics) -> Result<Artifact, ShaderCrossError> {
    let _span = tracing::debug_span!(
        "translate",
        from = ?request.from,
        target = %request.target,
        inputs = request.inputs.len()
    )
    .entered();

    if request.inputs.is_empty() {
        return Err(UsageError::NoInput.into());
    }

    let ir = match request.from {
        SourceLanguage::Glsl => {
            let names: Vec<&str> = request.inputs.iter().map(|i| i.name.as_str()).collect();
            let stage = stage::resolve(&request.stage, &names);
            if stage == Stage::None {
                return Err(UsageError::UnresolvedStage.into());
            }
            tracing::debug!(%stage, "resolved stage");

            let units = source_units(&request.inputs, log)?;
            let mut ast = GlslAst::new();
            let options = ParseOptions {
                names: names.iter().map(|name| (*name).to_owned()).collect(),
                include_directories: request.include_directories.clone(),
                ..ParseOptions::new(stage)
            };
            ast.parse(&units, &options, log)?;

            let spirv_options = match request.target {
                TargetLanguage::Spirv if request.version > 0 => {
                    SpirvOptions::with_version(request.version)
                }
                _ => SpirvOptions::default(),
            };
            let words = ast.to_spirv(&spirv_options, log)?;
            if request.target == TargetLanguage::Spirv {
                return Ok(Artifact::Words(words));
            }
            SpirvIr::from_words(&words, log)?
        }
        SourceLanguage::Spirv => {
            if request.inputs.len() != 1 {
                return Err(UsageError::TooManyBinaryInputs(request.inputs.len()).into());
            }
            let bytes = &request.inputs[0].bytes;
            if request.target == TargetLanguage::Spirv {
                return Ok(Artifact::Passthrough(bytes.clone()));
            }
            let mut ir = SpirvIr::new();
            ir.parse_bytes(bytes, log)?;
            ir
        }
    };

    let Some(dialect) = request.target.dialect() else {
        return Err(UsageError::UnknownTargetLanguage(request.target.to_string()).into());
    };
    let options = DialectOptions::with_version(dialect, request.version);
    ir.emit(&options, log).map(Artifact::Text)
}

fn source_units(inputs: &[Input], log: &mut Diagnostics) -> Result<Vec<SourceUnit>, ShaderCrossError> {
    inputs
        .iter()
        .map(|input| match std::str::from_utf8(&input.bytes) {
            Ok(text) => Ok(SourceUnit::named(input.name.clone(), text)),
            Err(err) => {
                let message = format!("{}: source is not valid UTF-8 ({err})", input.name);
                log.error(Phase::FrontEnd, message.clone());
                Err(ShaderCrossError::FrontEnd(message))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_names_parse() {
        assert_eq!("glsl".parse::<SourceLanguage>(), Ok(SourceLanguage::Glsl));
        assert_eq!("spirv".parse::<SourceLanguage>(), Ok(SourceLanguage::Spirv));
        assert_eq!(
            "hlsl".parse::<SourceLanguage>(),
            Err(UsageError::UnknownSourceLanguage("hlsl".into()))
        );
        for (name, target) in [
            ("spirv", TargetLanguage::Spirv),
            ("glsl", TargetLanguage::Glsl),
            ("essl", TargetLanguage::Essl),
            ("hlsl", TargetLanguage::Hlsl),
            ("msl", TargetLanguage::Msl),
        ] {
            assert_eq!(name.parse::<TargetLanguage>(), Ok(target));
            assert_eq!(target.to_string(), name);
        }
        assert!("wgsl".parse::<TargetLanguage>().is_err());
    }

    #[test]
    fn artifacts_render_for_files_and_streams() {
        let words = Artifact::Words(vec![0x0723_0203, 0x0001_0300]);
        assert_eq!(
            words.file_bytes(),
            [0x03, 0x02, 0x23, 0x07, 0x00, 0x03, 0x01, 0x00]
        );
        assert_eq!(words.stream_bytes().unwrap(), b"07230203 00010300\n");

        let passthrough = Artifact::Passthrough(vec![1, 2, 3]);
        assert_eq!(passthrough.file_bytes(), [1, 2, 3]);
        assert!(passthrough.stream_bytes().is_err());
    }

    #[test]
    fn invalid_utf8_fails_in_the_front_end() {
        let request = Request {
            inputs: vec![Input::new("bad.vert", vec![0xff, 0xfe])],
            ..Request::default()
        };
        let mut log = Diagnostics::new();
        let err = translate(&request, &mut log).unwrap_err();
        assert!(matches!(err, ShaderCrossError::FrontEnd(_)), "{err}");
        assert!(log.has_errors());
    }
}
