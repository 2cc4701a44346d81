use naga::valid::ModuleInfo;

use crate::backend::{DialectOptions, EsslOptions, GlslOptions, HlslOptions, MslOptions};
use crate::diagnostics::{error_chain, Diagnostics, Phase};
use crate::engine::EngineSession;
use crate::error::{ShaderCrossError, UsageError};
use crate::glsl::{GlslAst, ParseOptions, SourceUnit};
use crate::spirv::header::{self, SpirvHeader};
use crate::spirv::words::words_from_le_bytes;
use crate::stage::Stage;

/// A decoded and validated SPIR-V module. Read-only: emitting any dialect from it never
/// changes it.
#[derive(Debug)]
pub struct DecodedIr {
    module: naga::Module,
    info: ModuleInfo,
    header: SpirvHeader,
}

impl DecodedIr {
    pub fn header(&self) -> SpirvHeader {
        self.header
    }

    /// `(name, stage)` of every entry point, in module order.
    pub fn entry_points(&self) -> impl Iterator<Item = (&str, Stage)> + '_ {
        self.module
            .entry_points
            .iter()
            .map(|ep| (ep.name.as_str(), Stage::from_naga(ep.stage)))
    }

    pub(crate) fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn info(&self) -> &ModuleInfo {
        &self.info
    }
}

/// Owns one SPIR-V decode session.
///
/// After a successful [`SpirvIr::parse`] the decoded module can be emitted as any dialect,
/// in any order and from several threads at once (`&self` only). A failed parse discards
/// whatever was decoded before.
#[derive(Debug)]
pub struct SpirvIr {
    session: EngineSession,
    ir: Option<DecodedIr>,
}

impl Default for SpirvIr {
    fn default() -> Self {
        Self::new()
    }
}

impl SpirvIr {
    pub fn new() -> Self {
        Self {
            session: EngineSession::open(),
            ir: None,
        }
    }

    pub fn from_words(words: &[u32], log: &mut Diagnostics) -> Result<Self, ShaderCrossError> {
        let mut ir = Self::new();
        ir.parse(words, log)?;
        Ok(ir)
    }

    pub fn decoded(&self) -> Option<&DecodedIr> {
        self.ir.as_ref()
    }

    pub fn parse(
        &mut self,
        words: &[u32],
        log: &mut Diagnostics,
    ) -> Result<&DecodedIr, ShaderCrossError> {
        self.ir = None;

        let header = header::check(words).map_err(|err| failure(log, err.to_string()))?;

        let options = naga::front::spv::Options {
            adjust_coordinate_space: false,
            ..Default::default()
        };
        let module = naga::front::spv::Frontend::new(words.iter().copied(), &options)
            .parse()
            .map_err(|err| failure(log, error_chain(&err)))?;
        let info = self
            .session
            .engine()
            .validator()
            .validate(&module)
            .map_err(|err| failure(log, error_chain(&err)))?;

        tracing::debug!(
            words = words.len(),
            major = header.major,
            minor = header.minor,
            entry_points = module.entry_points.len(),
            "decoded SPIR-V"
        );

        Ok(self.ir.insert(DecodedIr {
            module,
            info,
            header,
        }))
    }

    /// Decodes a raw little-endian byte stream.
    pub fn parse_bytes(
        &mut self,
        bytes: &[u8],
        log: &mut Diagnostics,
    ) -> Result<&DecodedIr, ShaderCrossError> {
        self.ir = None;
        let words = words_from_le_bytes(bytes).map_err(|message| failure(log, message))?;
        self.parse(&words, log)
    }

    fn require_ir(&self, operation: &'static str) -> Result<&DecodedIr, ShaderCrossError> {
        self.ir
            .as_ref()
            .ok_or_else(|| UsageError::NotParsed(operation).into())
    }

    /// Emits the decoded module in the dialect selected by `options`.
    pub fn emit(
        &self,
        options: &DialectOptions,
        log: &mut Diagnostics,
    ) -> Result<String, ShaderCrossError> {
        let ir = self.require_ir(options.operation_name())?;
        options.emit(ir, log)
    }

    pub fn to_glsl(
        &self,
        options: &GlslOptions,
        log: &mut Diagnostics,
    ) -> Result<String, ShaderCrossError> {
        self.emit(&DialectOptions::Glsl(options.clone()), log)
    }

    pub fn to_essl(
        &self,
        options: &EsslOptions,
        log: &mut Diagnostics,
    ) -> Result<String, ShaderCrossError> {
        self.emit(&DialectOptions::Essl(options.clone()), log)
    }

    pub fn to_hlsl(
        &self,
        options: &HlslOptions,
        log: &mut Diagnostics,
    ) -> Result<String, ShaderCrossError> {
        self.emit(&DialectOptions::Hlsl(*options), log)
    }

    pub fn to_msl(
        &self,
        options: &MslOptions,
        log: &mut Diagnostics,
    ) -> Result<String, ShaderCrossError> {
        self.emit(&DialectOptions::Msl(*options), log)
    }

    /// Emits GLSL and parses it back into a fresh front-end session, giving an editable
    /// program for the same entry point.
    pub fn to_glsl_ast(
        &self,
        options: &GlslOptions,
        log: &mut Diagnostics,
    ) -> Result<GlslAst, ShaderCrossError> {
        let ir = self.require_ir("to_glsl_ast")?;
        let stage = match &options.entry_point {
            Some(name) => ir
                .entry_points()
                .find(|(ep, _)| *ep == name.as_str())
                .map(|(_, stage)| stage),
            None => ir.entry_points().next().map(|(_, stage)| stage),
        }
        .unwrap_or(Stage::None);

        let glsl = self.to_glsl(options, log)?;

        let mut ast = GlslAst::new();
        let parse_options = ParseOptions {
            enable_include: false,
            ..ParseOptions::new(stage)
        };
        ast.parse(&[SourceUnit::named("<spirv-glsl>", glsl)], &parse_options, log)?;
        Ok(ast)
    }
}

fn failure(log: &mut Diagnostics, message: String) -> ShaderCrossError {
    log.error(Phase::Decode, message.clone());
    ShaderCrossError::Decode(message)
}
