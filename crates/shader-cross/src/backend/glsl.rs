use naga::back::glsl;

use crate::backend::{EsslOptions, GlslOptions};
use crate::diagnostics::error_chain;
use crate::spirv::DecodedIr;
use crate::version;

pub(super) fn emit_desktop(ir: &DecodedIr, options: &GlslOptions) -> Result<String, String> {
    let version = version::passthrough(options.version)
        .map(|v| to_u16(v).map(glsl::Version::Desktop))
        .transpose()?;
    write(ir, version, options.entry_point.as_deref())
}

pub(super) fn emit_embedded(ir: &DecodedIr, options: &EsslOptions) -> Result<String, String> {
    let version = version::passthrough(options.version)
        .map(|v| {
            to_u16(v).map(|version| glsl::Version::Embedded {
                version,
                is_webgl: false,
            })
        })
        .transpose()?;
    write(ir, version, options.entry_point.as_deref())
}

fn to_u16(version: u32) -> Result<u16, String> {
    u16::try_from(version).map_err(|_| format!("GLSL version {version} is out of range"))
}

/// The GLSL writer emits a single entry point per call.
fn write(
    ir: &DecodedIr,
    version: Option<glsl::Version>,
    entry_point: Option<&str>,
) -> Result<String, String> {
    let module = ir.module();
    let entry = match entry_point {
        Some(name) => module
            .entry_points
            .iter()
            .find(|ep| ep.name == name)
            .ok_or_else(|| format!("entry point `{name}` not found"))?,
        None => module
            .entry_points
            .first()
            .ok_or_else(|| "module has no entry points".to_string())?,
    };

    let mut options = glsl::Options {
        writer_flags: glsl::WriterFlags::empty(),
        ..glsl::Options::default()
    };
    if let Some(version) = version {
        options.version = version;
    }
    let pipeline_options = glsl::PipelineOptions {
        shader_stage: entry.stage,
        entry_point: entry.name.clone(),
        multiview: None,
    };

    let mut out = String::new();
    {
        let mut writer = glsl::Writer::new(
            &mut out,
            module,
            ir.info(),
            &options,
            &pipeline_options,
            naga::proc::BoundsCheckPolicies::default(),
        )
        .map_err(|err| error_chain(&err))?;
        writer.write().map_err(|err| error_chain(&err))?;
    }
    Ok(out)
}
