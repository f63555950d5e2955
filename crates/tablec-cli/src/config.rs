//! `tablec.toml` loading and command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use tablec_model::{CompilerOptions, Result, TablecError};

/// Looked up in the input directory when no file is named explicitly.
pub const CONFIG_FILE_NAME: &str = "tablec.toml";

/// Values given on the command line; each one beats the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub namespace: Option<String>,
    pub jobs: Option<usize>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut options: CompilerOptions) -> CompilerOptions {
        if let Some(dir) = &self.output_dir {
            options.output_root.clone_from(dir);
        }
        if let Some(namespace) = &self.namespace {
            options.namespace.clone_from(namespace);
        }
        if self.jobs.is_some() {
            options.concurrency = self.jobs;
        }
        options
    }
}

/// Parses a configuration document; missing fields keep their defaults.
pub fn parse_options(text: &str, path: &Path) -> Result<CompilerOptions> {
    toml::from_str(text).map_err(|err| TablecError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Reads `explicit` if given, else `input_dir/tablec.toml` if present, else
/// returns the defaults.
pub fn load_options(explicit: Option<&Path>, input_dir: &Path) -> Result<CompilerOptions> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = input_dir.join(CONFIG_FILE_NAME);
            if !candidate.is_file() {
                debug!(dir = %input_dir.display(), "no configuration file, using defaults");
                return Ok(CompilerOptions::default());
            }
            candidate
        }
    };
    let text = fs::read_to_string(&path).map_err(|err| TablecError::Config {
        path: path.clone(),
        message: err.to_string(),
    })?;
    let options = parse_options(&text, &path)?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_files_keep_defaults() {
        let options = parse_options(
            "namespace = \"Game.Tables\"\nconcurrency = 2\n",
            Path::new("tablec.toml"),
        )
        .unwrap();
        assert_eq!(options.namespace, "Game.Tables");
        assert_eq!(options.concurrency, Some(2));
        assert_eq!(options.data_dir, "tables/");
        assert_eq!(options.code_imports, vec!["System"]);
    }

    #[test]
    fn malformed_files_name_the_path() {
        let err = parse_options("concurrency = \"many\"", Path::new("conf/tablec.toml")).unwrap_err();
        assert!(matches!(err, TablecError::Config { ref path, .. } if path == Path::new("conf/tablec.toml")));
    }

    #[test]
    fn input_directory_file_is_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "output_root = \"build\"").unwrap();
        let options = load_options(None, dir.path()).unwrap();
        assert_eq!(options.output_root, PathBuf::from("build"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_options(Some(&missing), dir.path()).is_err());
        assert_eq!(load_options(None, dir.path()).unwrap(), CompilerOptions::default());
    }

    #[test]
    fn overrides_beat_the_file() {
        let overrides = ConfigOverrides {
            output_dir: Some(PathBuf::from("out")),
            namespace: None,
            jobs: Some(4),
        };
        let options = overrides.apply(CompilerOptions::default().with_namespace("Keep"));
        assert_eq!(options.output_root, PathBuf::from("out"));
        assert_eq!(options.namespace, "Keep");
        assert_eq!(options.concurrency, Some(4));
    }
}
