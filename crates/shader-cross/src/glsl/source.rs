//! Assembly of source units into the single text the front end parses.

use super::include::{parse_directive, Directive, IncludeResolver, MAX_INCLUDE_DEPTH};
use super::SourceUnit;

/// A contiguous run of the assembled text that came from one origin.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    name: String,
    start: usize,
    first_line: usize,
}

/// Maps byte offsets in the assembled text back to `(origin name, 1-based line)`.
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceMap {
    segments: Vec<Segment>,
}

impl SourceMap {
    pub(crate) fn locate<'a>(&'a self, text: &str, offset: usize) -> Option<(&'a str, usize)> {
        let offset = offset.min(text.len());
        let segment = self
            .segments
            .iter()
            .rev()
            .find(|segment| segment.start <= offset)?;
        let newlines = text
            .get(segment.start..offset)
            .map(|run| run.bytes().filter(|b| *b == b'\n').count())
            .unwrap_or(0);
        Some((segment.name.as_str(), segment.first_line + newlines))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssemblyError {
    pub(crate) name: String,
    pub(crate) line: usize,
    pub(crate) message: String,
}

#[derive(Debug)]
pub(crate) struct Assembled {
    pub(crate) text: String,
    pub(crate) map: SourceMap,
}

pub(crate) struct Assembler<'a> {
    resolver: Option<IncludeResolver<'a>>,
    text: String,
    map: SourceMap,
}

impl<'a> Assembler<'a> {
    pub(crate) fn new(resolver: Option<IncludeResolver<'a>>) -> Self {
        Self {
            resolver,
            text: String::new(),
            map: SourceMap::default(),
        }
    }

    /// Assembles `units` in order, prepending `#version default_version` when the first unit
    /// has no `#version` directive and `default_version` is non-zero.
    pub(crate) fn assemble(
        mut self,
        units: &[SourceUnit],
        names: &[String],
        default_version: u32,
    ) -> Result<Assembled, AssemblyError> {
        let needs_version = units
            .first()
            .is_some_and(|unit| !declares_version(&unit.source));
        if needs_version && default_version != 0 {
            self.begin("<preamble>", 1);
            self.text.push_str(&format!("#version {default_version}\n"));
        }

        for (index, unit) in units.iter().enumerate() {
            let name = names.get(index).map(String::as_str).unwrap_or("");
            self.push(name, &unit.source, 0)?;
        }

        Ok(Assembled {
            text: self.text,
            map: self.map,
        })
    }

    fn begin(&mut self, name: &str, first_line: usize) {
        self.map.segments.push(Segment {
            name: name.to_owned(),
            start: self.text.len(),
            first_line,
        });
    }

    fn push(&mut self, name: &str, source: &str, depth: usize) -> Result<(), AssemblyError> {
        self.begin(name, 1);
        let mut in_block_comment = false;
        for (index, line) in source.split_inclusive('\n').enumerate() {
            let line_number = index + 1;
            let commented = in_block_comment;
            in_block_comment = block_comment_after(line, in_block_comment);
            let directive = self
                .resolver
                .filter(|_| !commented)
                .and_then(|resolver| parse_directive(line).map(|d| (resolver, d)));
            match directive {
                None => self.text.push_str(line),
                Some((_, Directive::IncludeExtension)) => self.text.push('\n'),
                Some((_, Directive::MalformedInclude)) => {
                    return Err(AssemblyError {
                        name: name.to_owned(),
                        line: line_number,
                        message: "malformed #include directive (expected \"path\" or <path>)"
                            .into(),
                    });
                }
                Some((resolver, Directive::Include(path))) => {
                    let fail = |message: String| AssemblyError {
                        name: name.to_owned(),
                        line: line_number,
                        message,
                    };
                    if depth >= MAX_INCLUDE_DEPTH {
                        return Err(fail(format!(
                            "#include nested deeper than {MAX_INCLUDE_DEPTH} levels"
                        )));
                    }
                    let (resolved, contents) = resolver.resolve(path).map_err(fail)?;
                    let included_name = resolved.display().to_string();
                    self.push(&included_name, &contents, depth + 1)?;
                    self.begin(name, line_number + 1);
                }
            }
        }
        if !source.ends_with('\n') {
            self.text.push('\n');
        }
        Ok(())
    }
}

/// Whether a `/* */` comment is still open at the end of `line`.
fn block_comment_after(line: &str, mut open: bool) -> bool {
    let mut rest = line;
    loop {
        if open {
            match rest.find("*/") {
                Some(end) => {
                    open = false;
                    rest = &rest[end + 2..];
                }
                None => return true,
            }
        } else {
            let block = rest.find("/*");
            let eol = rest.find("//");
            match (block, eol) {
                (Some(start), Some(comment)) if comment < start => return false,
                (Some(start), _) => {
                    open = true;
                    rest = &rest[start + 2..];
                }
                (None, _) => return false,
            }
        }
    }
}

/// Whether the first directive-or-code line of `source` is `#version`.
fn declares_version(source: &str) -> bool {
    let mut in_block_comment = false;
    for line in source.lines() {
        let mut line = line.trim();
        if in_block_comment {
            match line.find("*/") {
                Some(end) => {
                    in_block_comment = false;
                    line = line[end + 2..].trim();
                }
                None => continue,
            }
        }
        if let Some(body) = line.strip_prefix("/*") {
            match body.find("*/") {
                Some(end) => line = body[end + 2..].trim(),
                None => {
                    in_block_comment = true;
                    continue;
                }
            }
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        return line
            .strip_prefix('#')
            .is_some_and(|rest| rest.trim_start().starts_with("version"));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;

    fn unit(source: &str) -> SourceUnit {
        SourceUnit::new(source)
    }

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("<{i}>")).collect()
    }

    #[test]
    fn detects_version_directive() {
        assert!(declares_version("#version 450\nvoid main(){}"));
        assert!(declares_version("// header\n\n  # version 310 es\n"));
        assert!(declares_version("/* multi\nline */\n#version 450\n"));
        assert!(!declares_version("void main(){}\n#version 450\n"));
        assert!(!declares_version(""));
    }

    #[test]
    fn prepends_default_version_when_missing() {
        let assembled = Assembler::new(None)
            .assemble(&[unit("void main(){}")], &names(1), 450)
            .unwrap();
        assert_eq!(assembled.text, "#version 450\nvoid main(){}\n");
        assert_eq!(assembled.map.locate(&assembled.text, 14), Some(("<0>", 1)));
    }

    #[test]
    fn zero_default_version_adds_nothing() {
        let assembled = Assembler::new(None)
            .assemble(&[unit("void main(){}\n")], &names(1), 0)
            .unwrap();
        assert_eq!(assembled.text, "void main(){}\n");
    }

    #[test]
    fn units_concatenate_in_order_and_map_back() {
        let units = [unit("#version 450\nfloat a;"), unit("float b;\nvoid main(){}\n")];
        let assembled = Assembler::new(None)
            .assemble(&units, &names(2), 450)
            .unwrap();
        assert_eq!(assembled.text, "#version 450\nfloat a;\nfloat b;\nvoid main(){}\n");
        let main = assembled.text.find("void main").unwrap();
        assert_eq!(assembled.map.locate(&assembled.text, main), Some(("<1>", 2)));
        let a = assembled.text.find("float a").unwrap();
        assert_eq!(assembled.map.locate(&assembled.text, a), Some(("<0>", 2)));
    }

    #[test]
    fn includes_expand_and_keep_line_mapping() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("common.glsl"), "float shared_value;\n").unwrap();
        let dirs = vec![dir.path().to_path_buf()];

        let source = "#version 450\n#extension GL_GOOGLE_include_directive : require\n#include \"common.glsl\"\nvoid main(){}\n";
        let assembled = Assembler::new(Some(IncludeResolver::new(&dirs)))
            .assemble(&[unit(source)], &["main.vert".to_string()], 450)
            .unwrap();
        assert_eq!(
            assembled.text,
            "#version 450\n\nfloat shared_value;\nvoid main(){}\n"
        );

        let shared = assembled.text.find("float shared_value").unwrap();
        let (name, line) = assembled.map.locate(&assembled.text, shared).unwrap();
        assert!(name.ends_with("common.glsl"), "{name}");
        assert_eq!(line, 1);

        let main = assembled.text.find("void main").unwrap();
        assert_eq!(assembled.map.locate(&assembled.text, main), Some(("main.vert", 4)));
    }

    #[test]
    fn include_directives_pass_through_when_disabled() {
        let source = "#version 450\n#include \"common.glsl\"\n";
        let assembled = Assembler::new(None)
            .assemble(&[unit(source)], &names(1), 450)
            .unwrap();
        assert_eq!(assembled.text, source);
    }

    #[test]
    fn missing_include_reports_unit_and_line() {
        let dirs: Vec<PathBuf> = Vec::new();
        let err = Assembler::new(Some(IncludeResolver::new(&dirs)))
            .assemble(
                &[unit("#version 450\n\n#include <missing.glsl>\n")],
                &["shader.frag".to_string()],
                450,
            )
            .unwrap_err();
        assert_eq!(err.name, "shader.frag");
        assert_eq!(err.line, 3);
        assert!(err.message.contains("missing.glsl"), "{}", err.message);
    }

    #[test]
    fn commented_out_include_is_not_resolved() {
        let dirs: Vec<PathBuf> = Vec::new();
        let source = "#version 450\n/*\n#include \"nowhere.glsl\"\n*/\nvoid main(){ gl_Position = vec4(1.0); }\n";
        let assembled = Assembler::new(Some(IncludeResolver::new(&dirs)))
            .assemble(&[unit(source)], &names(1), 450)
            .unwrap();
        assert_eq!(assembled.text, source);
    }

    #[test]
    fn include_after_a_closed_comment_is_resolved() {
        let dirs: Vec<PathBuf> = Vec::new();
        let source = "/* a */ // b /*\n#include \"nowhere.glsl\"\n";
        let err = Assembler::new(Some(IncludeResolver::new(&dirs)))
            .assemble(&[unit(source)], &names(1), 0)
            .unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn tracks_block_comments_across_lines() {
        assert!(block_comment_after("float a; /* open", false));
        assert!(block_comment_after("still inside", true));
        assert!(!block_comment_after("done */ float b;", true));
        assert!(!block_comment_after("// /* not a comment opener", false));
        assert!(block_comment_after("/* a */ /* b", false));
    }

    #[test]
    fn recursive_include_hits_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("loop.glsl"), "#include \"loop.glsl\"\n").unwrap();
        let dirs = vec![dir.path().to_path_buf()];
        let err = Assembler::new(Some(IncludeResolver::new(&dirs)))
            .assemble(&[unit("#include \"loop.glsl\"\n")], &names(1), 0)
            .unwrap_err();
        assert!(err.message.contains("nested deeper"), "{}", err.message);
    }
}
