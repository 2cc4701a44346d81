use std::fs;
use std::path::{Path, PathBuf};

/// Nesting limit for `#include`. Also stops include cycles.
pub(crate) const MAX_INCLUDE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive<'a> {
    /// `#include "path"` or `#include <path>`.
    Include(&'a str),
    /// `#include` followed by something other than a quoted or bracketed path.
    MalformedInclude,
    /// `#extension GL_GOOGLE_include_directive : ...`.
    IncludeExtension,
}

/// Recognizes the include-related preprocessor directives on a single source line.
pub(crate) fn parse_directive(line: &str) -> Option<Directive<'_>> {
    let rest = line.trim().strip_prefix('#')?.trim_start();

    if let Some(rest) = rest.strip_prefix("include") {
        if !rest.starts_with(|c: char| c.is_whitespace() || c == '"' || c == '<') {
            return None;
        }
        let rest = rest.trim();
        let path = if let Some(quoted) = rest.strip_prefix('"') {
            quoted.strip_suffix('"')
        } else if let Some(bracketed) = rest.strip_prefix('<') {
            bracketed.strip_suffix('>')
        } else {
            None
        };
        return Some(match path {
            Some(path) if !path.is_empty() => Directive::Include(path),
            _ => Directive::MalformedInclude,
        });
    }

    let rest = rest.strip_prefix("extension")?;
    if rest.trim_start().starts_with("GL_GOOGLE_include_directive") {
        return Some(Directive::IncludeExtension);
    }
    None
}

/// Searches include directories in order; the first directory holding the file wins.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IncludeResolver<'a> {
    dirs: &'a [PathBuf],
}

impl<'a> IncludeResolver<'a> {
    pub(crate) fn new(dirs: &'a [PathBuf]) -> Self {
        Self { dirs }
    }

    pub(crate) fn resolve(&self, path: &str) -> Result<(PathBuf, String), String> {
        let requested = Path::new(path);
        for dir in self.dirs {
            let candidate = dir.join(requested);
            if !candidate.is_file() {
                continue;
            }
            return fs::read_to_string(&candidate)
                .map(|contents| (candidate.clone(), contents))
                .map_err(|err| format!("failed to read {}: {err}", candidate.display()));
        }
        if self.dirs.is_empty() {
            Err(format!("cannot find include `{path}` (no include directories)"))
        } else {
            Err(format!("cannot find include `{path}`"))
        }
    }
}
