//! Shader cross-compilation between GLSL source, SPIR-V binaries and the GLSL, ESSL,
//! HLSL and MSL dialects.
//!
//! The crate is organised as a pipeline:
//!
//! - [`stage`] resolves the pipeline stage from an explicit token or a file extension.
//! - [`version`] translates user-facing version numbers into what each collaborator expects.
//! - [`glsl::GlslAst`] owns one front-end parse session and lowers it to SPIR-V.
//! - [`spirv::SpirvIr`] owns one decoded SPIR-V module and emits dialect text through
//!   [`backend`].
//! - [`pipeline`] sequences the above for the `shaderx` command line tool.
//!
//! Every operation appends collaborator messages to a caller-provided [`Diagnostics`] log,
//! and failures short-circuit with a [`ShaderCrossError`].

#![forbid(unsafe_code)]

pub mod backend;
pub mod diagnostics;
pub mod engine;
mod error;
pub mod glsl;
pub mod pipeline;
pub mod spirv;
pub mod stage;
pub mod version;

pub use crate::backend::{
    Dialect, DialectOptions, EsslOptions, GlslOptions, HlslOptions, MslOptions, MslPlatform,
};
pub use crate::diagnostics::{Diagnostic, Diagnostics, Phase, Severity};
pub use crate::error::{ShaderCrossError, UsageError};
pub use crate::glsl::{GlslAst, ParseOptions, Program, SourceUnit};
pub use crate::pipeline::{translate, Artifact, Input, Request, SourceLanguage, TargetLanguage};
pub use crate::spirv::{DecodedIr, SpirvIr, SpirvOptions};
pub use crate::stage::Stage;
pub use crate::version::MslVersion;
