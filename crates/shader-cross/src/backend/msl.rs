use naga::back::msl;

use crate::backend::{MslOptions, MslPlatform};
use crate::diagnostics::{error_chain, Diagnostics, Phase};
use crate::spirv::DecodedIr;
use crate::Dialect;

pub(super) fn emit(
    ir: &DecodedIr,
    options: &MslOptions,
    log: &mut Diagnostics,
) -> Result<String, String> {
    let mut writer_options = msl::Options::default();
    if let Some(version) = options.version {
        let major = u8::try_from(version.major)
            .map_err(|_| format!("MSL version {version} is out of range"))?;
        let minor = u8::try_from(version.minor)
            .map_err(|_| format!("MSL version {version} is out of range"))?;
        writer_options.lang_version = (major, minor);
        if version.patch != 0 {
            tracing::warn!(%version, "MSL patch level is ignored by the Metal writer");
            log.warning(
                Phase::Emit(Dialect::Msl),
                format!(
                    "MSL patch level in {version} is ignored; emitting language version {major}.{minor}"
                ),
            );
        }
    }
    let platform = platform_name(options.platform);
    if honors_platform(options.platform) {
        tracing::debug!(platform, "emitting MSL");
    } else {
        tracing::warn!(platform, "MSL platform is ignored by the Metal writer");
    }

    let (source, _) = msl::write_string(
        ir.module(),
        ir.info(),
        &writer_options,
        &msl::PipelineOptions::default(),
    )
    .map_err(|err| error_chain(&err))?;
    Ok(source)
}

fn platform_name(platform: MslPlatform) -> &'static str {
    match platform {
        MslPlatform::Ios => "ios",
        MslPlatform::MacOs => "macos",
    }
}

/// naga's Metal writer has no platform switch. macOS is the default, so only it is honored as given.
fn honors_platform(platform: MslPlatform) -> bool {
    platform == MslPlatform::MacOs
}
