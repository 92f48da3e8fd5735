//! External mesh format conversion.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

use crate::config::{ConfigError, ConverterConfig};

/// Errors from a single conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Source mesh not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Failed to start converter {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter exited with {0}")]
    Failed(ExitStatus),

    #[error("Converter finished but produced no file at {}", .0.display())]
    NoOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts a mesh file into the importable interchange format.
pub trait MeshConverter {
    /// Convert `source` into a file inside `out_dir` and return its path.
    fn convert(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, ConvertError>;
}

/// Runs the configured converter program as a child process.
///
/// The command line is `<program> <args...> <source> <out_dir>/<stem>.<ext>`.
/// A non-zero exit and a missing output file are both failures.
#[derive(Clone, Debug)]
pub struct ExternalConverter {
    config: ConverterConfig,
}

impl ExternalConverter {
    /// Create a converter, validating that the program exists.
    pub fn new(config: ConverterConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Where the converter is expected to write its output for `source`.
    pub fn output_path(&self, source: &Path, out_dir: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "mesh".to_string());
        out_dir.join(format!("{}.{}", stem, self.config.target_extension))
    }
}

impl MeshConverter for ExternalConverter {
    fn convert(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, ConvertError> {
        if !source.is_file() {
            return Err(ConvertError::SourceMissing(source.to_path_buf()));
        }

        std::fs::create_dir_all(out_dir)?;
        let output_path = self.output_path(source, out_dir);

        // A file left by an earlier run must not pass for this run's output
        match std::fs::remove_file(&output_path) {
            Ok(()) => log::debug!("Removed stale output {}", output_path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        log::info!(
            "Converting {} -> {}",
            source.display(),
            output_path.display()
        );

        let output = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(source)
            .arg(&output_path)
            .output()
            .map_err(|source| ConvertError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            log::warn!("Converter failed on {}", source.display());
            log::warn!("stdout:\n{}", stdout.trim_end());
            log::warn!("stderr:\n{}", stderr.trim_end());
            return Err(ConvertError::Failed(output.status));
        }

        if !output_path.is_file() {
            log::warn!("Converter log:\n{}", stdout.trim_end());
            return Err(ConvertError::NoOutput(output_path));
        }

        log::debug!("Converter output:\n{}", stdout.trim_end());
        Ok(output_path)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell_converter(script: &str) -> ExternalConverter {
        // sh -c '<script>' <source> <output>: the script sees them as $0 and $1
        ExternalConverter::new(ConverterConfig::new("/bin/sh").with_args(["-c", script])).unwrap()
    }

    #[test]
    fn test_convert_success() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("stem.dae");
        std::fs::write(&source, "collada").unwrap();
        let out_dir = dir.path().join("out");

        let converter = shell_converter(r#"cp "$0" "$1""#);
        let output = converter.convert(&source, &out_dir).unwrap();

        assert_eq!(output, out_dir.join("stem.fbx"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "collada");
    }

    #[test]
    fn test_convert_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("stem.dae");
        std::fs::write(&source, "collada").unwrap();

        let converter = shell_converter("echo broken >&2; exit 3");
        let err = converter.convert(&source, dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::Failed(status) if status.code() == Some(3)));
    }

    #[test]
    fn test_convert_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("stem.dae");
        std::fs::write(&source, "collada").unwrap();

        let converter = shell_converter("true");
        let err = converter.convert(&source, dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::NoOutput(_)));
    }

    #[test]
    fn test_stale_output_is_not_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("stem.dae");
        std::fs::write(&source, "collada").unwrap();
        let out_dir = dir.path().join("scratch");
        std::fs::create_dir_all(&out_dir).unwrap();
        std::fs::write(out_dir.join("stem.fbx"), "stale").unwrap();

        let converter = shell_converter("true");
        let err = converter.convert(&source, &out_dir).unwrap_err();
        assert!(matches!(err, ConvertError::NoOutput(_)));
        assert!(!out_dir.join("stem.fbx").exists());
    }

    #[test]
    fn test_convert_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let converter = shell_converter(r#"cp "$0" "$1""#);

        let err = converter
            .convert(&dir.path().join("nope.dae"), dir.path())
            .unwrap_err();
        assert!(matches!(err, ConvertError::SourceMissing(_)));
    }

    #[test]
    fn test_output_path_uses_target_extension() {
        let converter = ExternalConverter::new(
            ConverterConfig::new("/bin/sh").with_target_extension("glb"),
        )
        .unwrap();
        assert_eq!(
            converter.output_path(Path::new("/m/leaf.v2.dae"), Path::new("/tmp/out")),
            PathBuf::from("/tmp/out/leaf.v2.glb")
        );
    }
}
