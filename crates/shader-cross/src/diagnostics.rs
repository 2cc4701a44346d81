//! Append-only diagnostics log shared by every pipeline phase.

use std::fmt;

use crate::backend::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    FrontEnd,
    Encode,
    Decode,
    Emit(Dialect),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::FrontEnd => f.write_str("front-end"),
            Phase::Encode => f.write_str("encode"),
            Phase::Decode => f.write_str("decode"),
            Phase::Emit(dialect) => write!(f, "emit-{dialect}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{severity}[{}]: {}", self.phase, self.message)
    }
}

/// Ordered diagnostics from any number of calls.
///
/// Entries can only be appended. Successful calls may still leave warnings here, so callers
/// decide whether to surface a non-empty log; failed calls always leave at least one error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phase: Phase, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Warning => tracing::warn!(%phase, "{message}"),
            Severity::Error => tracing::debug!(%phase, "{message}"),
        }
        self.entries.push(Diagnostic {
            phase,
            severity,
            message,
        });
    }

    pub fn error(&mut self, phase: Phase, message: impl Into<String>) {
        self.push(phase, Severity::Error, message);
    }

    pub fn warning(&mut self, phase: Phase, message: impl Into<String>) {
        self.push(phase, Severity::Warning, message);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Messages of every entry in `phase`, in order.
    pub fn messages(&self, phase: Phase) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |d| d.phase == phase)
            .map(|d| d.message.as_str())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Renders an error and its `source()` chain as `outer: inner: ...`.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_line_per_entry() {
        let mut log = Diagnostics::new();
        log.warning(Phase::FrontEnd, "unused variable");
        log.error(Phase::Emit(Dialect::Hlsl), "unsupported");
        assert_eq!(
            log.to_string(),
            "warning[front-end]: unused variable\nerror[emit-hlsl]: unsupported"
        );
        assert!(log.has_errors());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn extend_keeps_order() {
        let mut a = Diagnostics::new();
        a.warning(Phase::Decode, "first");
        let mut b = Diagnostics::new();
        b.warning(Phase::Decode, "second");
        a.extend(b);
        assert_eq!(a.messages(Phase::Decode).collect::<Vec<_>>(), ["first", "second"]);
        assert!(!a.has_errors());
    }

    #[test]
    fn error_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(error_chain(&io), "missing");
    }
}
