//! Compiler configuration.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Upper bound on worker threads when the cap is derived.
pub const MAX_DERIVED_WORKERS: usize = 6;

/// Options consumed by a compile run. Every field has a default so a
/// partial configuration file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Root of the output tree; cleared before a successful emission.
    pub output_root: PathBuf,
    /// Record files directory, relative to the output root.
    pub data_dir: String,
    /// Companion code directory, relative to the output root.
    pub code_dir: String,
    /// Namespace wrapping generated code; empty for none.
    pub namespace: String,
    /// `using` lines at the top of every generated schema file.
    pub code_imports: Vec<String>,
    /// Worker cap; derived from available parallelism when unset.
    pub concurrency: Option<usize>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            data_dir: "tables/".to_string(),
            code_dir: "scripts/".to_string(),
            namespace: String::new(),
            code_imports: vec!["System".to_string()],
            concurrency: None,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, workers: Option<usize>) -> Self {
        self.concurrency = workers;
        self
    }

    #[must_use]
    pub fn with_code_imports(mut self, imports: Vec<String>) -> Self {
        self.code_imports = imports;
        self
    }

    pub fn data_path(&self) -> PathBuf {
        self.output_root.join(&self.data_dir)
    }

    pub fn code_path(&self) -> PathBuf {
        self.output_root.join(&self.code_dir)
    }

    /// Effective worker cap, never below one.
    pub fn worker_cap(&self) -> usize {
        self.concurrency
            .unwrap_or_else(derived_worker_cap)
            .max(1)
    }
}

/// Half the cores plus one on large machines, three otherwise, at most six.
pub fn derived_worker_cap() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    worker_cap_for(cpus)
}

pub fn worker_cap_for(cpus: usize) -> usize {
    let cap = if cpus >= 10 { cpus / 2 + 1 } else { 3 };
    cap.min(MAX_DERIVED_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_cap_is_bounded() {
        assert_eq!(worker_cap_for(1), 3);
        assert_eq!(worker_cap_for(8), 3);
        assert_eq!(worker_cap_for(10), 6);
        assert_eq!(worker_cap_for(64), 6);
    }

    #[test]
    fn configured_cap_wins() {
        let options = CompilerOptions::new().with_concurrency(Some(0));
        assert_eq!(options.worker_cap(), 1);
        let options = CompilerOptions::new().with_concurrency(Some(12));
        assert_eq!(options.worker_cap(), 12);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let options: CompilerOptions =
            toml::from_str("namespace = \"Game.Data\"\n").expect("parse options");
        assert_eq!(options.namespace, "Game.Data");
        assert_eq!(options.data_dir, "tables/");
        assert_eq!(options.code_imports, vec!["System".to_string()]);
        assert_eq!(options.data_path(), PathBuf::from("output").join("tables/"));
    }
}
