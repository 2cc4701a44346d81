//! GLSL front end.
//!
//! [`GlslAst`] owns one parse session. A successful [`GlslAst::parse`] stores a validated
//! [`Program`], replacing the previous one; a failed parse leaves the facade empty. The
//! stored program can then be lowered to SPIR-V or, through a decode step, to HLSL/MSL.

mod include;
mod position;
mod source;

use std::path::PathBuf;

use naga::valid::ModuleInfo;

use crate::backend::{HlslOptions, MslOptions};
use crate::diagnostics::{error_chain, Diagnostics, Phase};
use crate::engine::EngineSession;
use crate::error::{ShaderCrossError, UsageError};
use crate::spirv::{self, SpirvIr, SpirvOptions};
use crate::stage::Stage;
use crate::version::defaults;

use self::include::IncludeResolver;
use self::source::{Assembled, Assembler};

/// One fragment of GLSL source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: Option<String>,
    pub source: String,
}

impl SourceUnit {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            name: None,
            source: source.into(),
        }
    }

    pub fn named(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            source: source.into(),
        }
    }

    /// Length of the source text in bytes.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub stage: Stage,
    /// Version assumed when the first unit has no `#version` directive. `0` adds nothing.
    pub default_version: u32,
    /// Name given to the program's entry point.
    pub entry_point: String,
    pub enable_include: bool,
    /// Names for the source units, parallel to the units. Ignored unless it covers every unit.
    pub names: Vec<String>,
    /// Searched in order by `#include`; the first directory holding the file wins.
    pub include_directories: Vec<PathBuf>,
}

impl ParseOptions {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            stage: Stage::None,
            default_version: defaults::FRONT_END_VERSION,
            entry_point: defaults::ENTRY_POINT.to_owned(),
            enable_include: true,
            names: Vec::new(),
            include_directories: Vec::new(),
        }
    }
}

/// A parsed and validated GLSL program.
#[derive(Debug)]
pub struct Program {
    module: naga::Module,
    info: ModuleInfo,
    stage: Stage,
    entry_point: String,
}

impl Program {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub(crate) fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn info(&self) -> &ModuleInfo {
        &self.info
    }
}

#[derive(Debug)]
pub struct GlslAst {
    session: EngineSession,
    program: Option<Program>,
}

impl Default for GlslAst {
    fn default() -> Self {
        Self::new()
    }
}

impl GlslAst {
    pub fn new() -> Self {
        Self {
            session: EngineSession::open(),
            program: None,
        }
    }

    /// The program stored by the last successful parse.
    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    /// Parses `units` as one program.
    ///
    /// Any previously stored program is discarded first, so a failed parse always leaves the
    /// facade without a program.
    pub fn parse(
        &mut self,
        units: &[SourceUnit],
        options: &ParseOptions,
        log: &mut Diagnostics,
    ) -> Result<&Program, ShaderCrossError> {
        self.program = None;

        if options.stage.is_none() {
            return Err(UsageError::UnresolvedStage.into());
        }
        if units.is_empty() {
            return Err(UsageError::NoInput.into());
        }

        let names = unit_names(units, &options.names);
        let resolver = options
            .enable_include
            .then(|| IncludeResolver::new(&options.include_directories));
        let assembled = Assembler::new(resolver)
            .assemble(units, &names, options.default_version)
            .map_err(|err| {
                front_end_failure(log, format!("{}:{}: {}", err.name, err.line, err.message))
            })?;

        let Some(naga_stage) = options.stage.to_naga() else {
            return Err(front_end_failure(
                log,
                format!("the GLSL front end does not support {} shaders", options.stage),
            ));
        };

        let mut frontend = naga::front::glsl::Frontend::default();
        let mut module = frontend
            .parse(&naga::front::glsl::Options::from(naga_stage), &assembled.text)
            .map_err(|errors| {
                let rendered: Vec<String> = errors
                    .errors
                    .iter()
                    .map(|err| located(&assembled, err.meta.to_range(), &err.kind.to_string()))
                    .collect();
                for message in &rendered {
                    log.error(Phase::FrontEnd, message.clone());
                }
                ShaderCrossError::FrontEnd(rendered.join("\n"))
            })?;

        if !options.entry_point.is_empty() {
            for entry in module.entry_points.iter_mut() {
                entry.name.clone_from(&options.entry_point);
            }
        }

        let implicit = position::add_implicit_position(&mut module);
        if implicit > 0 {
            tracing::debug!(entry_points = implicit, "added implicit gl_Position output");
        }

        let info = self
            .session
            .engine()
            .validator()
            .validate(&module)
            .map_err(|err| {
                let span = err.spans().next().and_then(|(span, _)| span.to_range());
                front_end_failure(log, located(&assembled, span, &error_chain(&err)))
            })?;

        tracing::debug!(
            stage = %options.stage,
            units = units.len(),
            bytes = assembled.text.len(),
            "parsed GLSL program"
        );

        Ok(self.program.insert(Program {
            module,
            info,
            stage: options.stage,
            entry_point: options.entry_point.clone(),
        }))
    }

    /// Parses a single unnamed source string.
    pub fn parse_str(
        &mut self,
        source: &str,
        options: &ParseOptions,
        log: &mut Diagnostics,
    ) -> Result<&Program, ShaderCrossError> {
        self.parse(&[SourceUnit::new(source)], options, log)
    }

    fn require_program(&self, operation: &'static str) -> Result<&Program, ShaderCrossError> {
        self.program
            .as_ref()
            .ok_or_else(|| UsageError::NotParsed(operation).into())
    }

    /// Lowers the stored program to SPIR-V words.
    pub fn to_spirv(
        &self,
        options: &SpirvOptions,
        log: &mut Diagnostics,
    ) -> Result<Vec<u32>, ShaderCrossError> {
        let program = self.require_program("to_spirv")?;
        spirv::encode(program, options, log)
    }

    /// Lowers the stored program to SPIR-V and decodes it into a fresh IR facade.
    pub fn to_spirv_ir(
        &self,
        options: &SpirvOptions,
        log: &mut Diagnostics,
    ) -> Result<SpirvIr, ShaderCrossError> {
        let words = self.to_spirv(options, log)?;
        SpirvIr::from_words(&words, log)
    }

    pub fn to_hlsl(
        &self,
        options: &HlslOptions,
        log: &mut Diagnostics,
    ) -> Result<String, ShaderCrossError> {
        self.to_spirv_ir(&SpirvOptions::default(), log)?
            .to_hlsl(options, log)
    }

    pub fn to_msl(
        &self,
        options: &MslOptions,
        log: &mut Diagnostics,
    ) -> Result<String, ShaderCrossError> {
        self.to_spirv_ir(&SpirvOptions::default(), log)?
            .to_msl(options, log)
    }
}

/// Explicit names win when they cover every unit; otherwise each unit keeps its own name or
/// gets an index placeholder such as `<0>`.
fn unit_names(units: &[SourceUnit], explicit: &[String]) -> Vec<String> {
    if explicit.len() >= units.len() {
        return explicit[..units.len()].to_vec();
    }
    units
        .iter()
        .enumerate()
        .map(|(index, unit)| unit.name.clone().unwrap_or_else(|| format!("<{index}>")))
        .collect()
}

fn located(assembled: &Assembled, span: Option<std::ops::Range<usize>>, message: &str) -> String {
    match span.and_then(|range| assembled.map.locate(&assembled.text, range.start)) {
        Some((name, line)) => format!("{name}:{line}: {message}"),
        None => message.to_owned(),
    }
}

fn front_end_failure(log: &mut Diagnostics, message: String) -> ShaderCrossError {
    log.error(Phase::FrontEnd, message.clone());
    ShaderCrossError::FrontEnd(message)
}
