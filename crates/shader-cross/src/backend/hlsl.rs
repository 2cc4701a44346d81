use naga::back::hlsl;

use crate::backend::HlslOptions;
use crate::diagnostics::error_chain;
use crate::spirv::DecodedIr;
use crate::version;

/// Maps a two-digit shader model (`60`) to the writer's enum.
fn shader_model(model: u32) -> Result<hlsl::ShaderModel, String> {
    Ok(match model {
        50 => hlsl::ShaderModel::V5_0,
        51 => hlsl::ShaderModel::V5_1,
        60 => hlsl::ShaderModel::V6_0,
        61 => hlsl::ShaderModel::V6_1,
        62 => hlsl::ShaderModel::V6_2,
        63 => hlsl::ShaderModel::V6_3,
        64 => hlsl::ShaderModel::V6_4,
        65 => hlsl::ShaderModel::V6_5,
        66 => hlsl::ShaderModel::V6_6,
        67 => hlsl::ShaderModel::V6_7,
        other => return Err(format!("unsupported shader model {other}")),
    })
}

pub(super) fn emit(ir: &DecodedIr, options: &HlslOptions) -> Result<String, String> {
    let mut writer_options = hlsl::Options::default();
    if let Some(model) = version::passthrough(options.shader_model) {
        writer_options.shader_model = shader_model(model)?;
    }

    let mut out = String::new();
    {
        let mut writer = hlsl::Writer::new(&mut out, &writer_options);
        writer
            .write(ir.module(), ir.info(), None)
            .map_err(|err| error_chain(&err))?;
    }
    Ok(out)
}
