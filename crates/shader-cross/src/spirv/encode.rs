use naga::back::spv;

use crate::diagnostics::{error_chain, Diagnostics, Phase};
use crate::error::ShaderCrossError;
use crate::glsl::Program;
use crate::spirv::header::MAX_MINOR_VERSION;
use crate::spirv::SpirvOptions;
use crate::version;

/// Lowers a validated program to SPIR-V words.
///
/// Writer failures are reported as [`ShaderCrossError::Encode`]; they are never swallowed.
pub(crate) fn encode(
    program: &Program,
    options: &SpirvOptions,
    log: &mut Diagnostics,
) -> Result<Vec<u32>, ShaderCrossError> {
    let mut writer_options = spv::Options::default();
    // GLSL sources already use Vulkan clip space; keep positions as written.
    writer_options
        .flags
        .remove(spv::WriterFlags::ADJUST_COORDINATE_SPACE);

    if let Some(word) = version::spirv_version_word(options.version) {
        let (major, minor) = version::spirv_word_to_pair(word);
        if options.version / 10 != 1 || minor > MAX_MINOR_VERSION {
            return Err(failure(
                log,
                format!("unsupported SPIR-V version {}", options.version),
            ));
        }
        writer_options.lang_version = (major, minor);
    }

    let words = spv::write_vec(program.module(), program.info(), &writer_options, None)
        .map_err(|err| failure(log, error_chain(&err)))?;

    tracing::debug!(
        words = words.len(),
        version = ?writer_options.lang_version,
        entry_point = program.entry_point(),
        "encoded SPIR-V"
    );
    Ok(words)
}

fn failure(log: &mut Diagnostics, message: String) -> ShaderCrossError {
    log.error(Phase::Encode, message.clone());
    ShaderCrossError::Encode(message)
}
