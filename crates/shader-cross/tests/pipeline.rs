use std::fs;

use pretty_assertions::assert_eq;
use shader_cross::{
    translate, Artifact, Diagnostics, Input, Request, ShaderCrossError, SourceLanguage,
    TargetLanguage, UsageError,
};

const VERTEX: &str = "#version 450\nvoid main() { gl_Position = vec4(0.0, 0.0, 0.0, 1.0); }\n";

fn glsl_request(name: &str, source: &str, target: TargetLanguage) -> Request {
    Request {
        inputs: vec![Input::new(name, source)],
        target,
        ..Request::default()
    }
}

fn spirv_words() -> Vec<u32> {
    let mut log = Diagnostics::new();
    match translate(&glsl_request("a.vert", VERTEX, TargetLanguage::Spirv), &mut log) {
        Ok(Artifact::Words(words)) => words,
        other => panic!("expected SPIR-V words, got {other:?}"),
    }
}

#[test]
fn vertex_to_spirv_with_defaults() {
    let words = spirv_words();
    assert_eq!(words[0], 0x0723_0203);
    assert_eq!(words[1], 0x0001_0300);
}

#[test]
fn vertex_to_hlsl() {
    let mut log = Diagnostics::new();
    let artifact = translate(&glsl_request("a.vert", VERTEX, TargetLanguage::Hlsl), &mut log).unwrap();
    let Artifact::Text(hlsl) = artifact else {
        panic!("expected text");
    };
    assert!(hlsl.contains("SV_Position"), "{hlsl}");
}

#[test]
fn explicit_stage_beats_the_extension() {
    let mut log = Diagnostics::new();
    let request = Request {
        stage: "vs".to_owned(),
        ..glsl_request("shader.frag", VERTEX, TargetLanguage::Spirv)
    };
    assert!(matches!(
        translate(&request, &mut log),
        Ok(Artifact::Words(_))
    ));
}

#[test]
fn unknown_stage_runs_no_phase() {
    let mut log = Diagnostics::new();
    let err = translate(&glsl_request("foo.txt", VERTEX, TargetLanguage::Spirv), &mut log)
        .unwrap_err();
    assert!(matches!(
        err,
        ShaderCrossError::Usage(UsageError::UnresolvedStage)
    ));
    assert!(log.is_empty());
}

#[test]
fn empty_request_is_rejected() {
    let mut log = Diagnostics::new();
    let err = translate(&Request::default(), &mut log).unwrap_err();
    assert!(matches!(err, ShaderCrossError::Usage(UsageError::NoInput)));
}

#[test]
fn spirv_passthrough_is_byte_identical() {
    let bytes: Vec<u8> = spirv_words().iter().flat_map(|w| w.to_le_bytes()).collect();
    let request = Request {
        inputs: vec![Input::new("a.spv", bytes.clone())],
        from: SourceLanguage::Spirv,
        ..Request::default()
    };
    let mut log = Diagnostics::new();
    let artifact = translate(&request, &mut log).unwrap();
    assert_eq!(artifact.file_bytes(), bytes);
}

#[test]
fn spirv_input_takes_one_source() {
    let request = Request {
        inputs: vec![Input::new("a.spv", Vec::new()), Input::new("b.spv", Vec::new())],
        from: SourceLanguage::Spirv,
        ..Request::default()
    };
    let mut log = Diagnostics::new();
    let err = translate(&request, &mut log).unwrap_err();
    assert!(matches!(
        err,
        ShaderCrossError::Usage(UsageError::TooManyBinaryInputs(2))
    ));
}

#[test]
fn truncated_spirv_stops_before_emission() {
    let mut bytes: Vec<u8> = spirv_words().iter().flat_map(|w| w.to_le_bytes()).collect();
    bytes.truncate(10);
    let request = Request {
        inputs: vec![Input::new("a.spv", bytes)],
        from: SourceLanguage::Spirv,
        target: TargetLanguage::Msl,
        ..Request::default()
    };
    let mut log = Diagnostics::new();
    let err = translate(&request, &mut log).unwrap_err();
    assert!(matches!(err, ShaderCrossError::Decode(_)), "{err}");
    assert!(log.iter().all(|d| d.phase == shader_cross::Phase::Decode));
}

#[test]
fn target_version_selects_the_dialect_version() {
    let mut log = Diagnostics::new();
    let request = Request {
        version: 310,
        ..glsl_request("a.vert", VERTEX, TargetLanguage::Essl)
    };
    let Artifact::Text(essl) = translate(&request, &mut log).unwrap() else {
        panic!("expected text");
    };
    assert!(essl.starts_with("#version 310 es"), "{essl}");
}

#[test]
fn front_end_errors_name_the_unit_and_line() {
    let mut log = Diagnostics::new();
    let source = "#version 450\n\nvoid main() {\n    gl_Position = missing;\n}\n";
    let err = translate(&glsl_request("broken.vert", source, TargetLanguage::Spirv), &mut log)
        .unwrap_err();
    assert!(matches!(err, ShaderCrossError::FrontEnd(_)), "{err}");
    assert!(err.to_string().contains("broken.vert:4:"), "{err}");
}

#[test]
fn includes_are_searched_in_order() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(
        first.path().join("pos.glsl"),
        "vec4 pos() { return vec4(0.0, 0.0, 0.0, 1.0); }\n",
    )
    .unwrap();
    fs::write(second.path().join("pos.glsl"), "this is not glsl\n").unwrap();

    let source = "#version 450\n#include \"pos.glsl\"\nvoid main() { gl_Position = pos(); }\n";
    let request = Request {
        include_directories: vec![first.path().to_owned(), second.path().to_owned()],
        ..glsl_request("a.vert", source, TargetLanguage::Spirv)
    };
    let mut log = Diagnostics::new();
    assert!(translate(&request, &mut log).is_ok(), "{log}");

    let reversed = Request {
        include_directories: vec![second.path().to_owned(), first.path().to_owned()],
        ..request
    };
    assert!(translate(&reversed, &mut log).is_err());
}

#[test]
fn empty_vertex_main_translates_to_hlsl() {
    let request = Request {
        stage: "vs".to_owned(),
        inputs: vec![Input::new("-", "#version 450\nvoid main(){}\n")],
        target: TargetLanguage::Hlsl,
        ..Request::default()
    };
    let mut log = Diagnostics::new();
    let artifact = translate(&request, &mut log).unwrap();
    let Artifact::Text(hlsl) = artifact else {
        panic!("expected text");
    };
    assert!(!hlsl.is_empty());
    assert!(hlsl.contains("SV_Position"), "{hlsl}");
    assert!(!log.has_errors(), "{log}");
}

#[test]
fn vertex_outputs_without_position_still_translate() {
    let source = "#version 450\nlayout(location = 0) out vec2 uv;\nvoid main() { uv = vec2(0.5); }\n";
    for target in [TargetLanguage::Spirv, TargetLanguage::Hlsl, TargetLanguage::Msl] {
        let mut log = Diagnostics::new();
        let result = translate(&glsl_request("uv.vert", source, target), &mut log);
        assert!(result.is_ok(), "{target:?}: {log}");
    }
}
