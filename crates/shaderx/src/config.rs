use std::ffi::OsString;
use std::path::PathBuf;

pub const INCLUDE_PATH_ENV: &str = "SHADERX_INCLUDE_PATH";

/// Settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Searched after every `-I` directory, in order.
    pub include_path: Vec<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_include_path(std::env::var_os(INCLUDE_PATH_ENV))
    }

    fn from_include_path(raw: Option<OsString>) -> Self {
        let include_path = raw
            .map(|raw| {
                std::env::split_paths(&raw)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { include_path }
    }

    /// `-I` directories first, then the environment's.
    pub fn include_directories(&self, flags: &[PathBuf]) -> Vec<PathBuf> {
        flags
            .iter()
            .chain(self.include_path.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_adds_nothing() {
        let config = Config::from_include_path(None);
        assert!(config.include_path.is_empty());
        assert_eq!(
            config.include_directories(&[PathBuf::from("a")]),
            vec![PathBuf::from("a")]
        );
    }

    #[test]
    fn environment_directories_follow_flags() {
        let raw = std::env::join_paths(["env-one", "env-two"]).unwrap();
        let config = Config::from_include_path(Some(raw));
        assert_eq!(
            config.include_directories(&[PathBuf::from("flag")]),
            vec![
                PathBuf::from("flag"),
                PathBuf::from("env-one"),
                PathBuf::from("env-two"),
            ]
        );
    }

    #[test]
    fn empty_entries_are_skipped() {
        let config = Config::from_include_path(Some(OsString::new()));
        assert!(config.include_path.is_empty());
    }
}
