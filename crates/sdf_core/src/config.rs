//! Import configuration.
//!
//! The external mesh converter is resolved once per process, from explicit
//! input (command-line flags) or the environment, and validated before the
//! first conversion runs.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `SDF_IMPORT_CONVERTER` | converter program (path, or a name found on `PATH`) |
//! | `SDF_IMPORT_CONVERTER_ARGS` | whitespace-separated arguments placed before `<source> <output>` |
//! | `SDF_IMPORT_TARGET_EXT` | extension the converter produces and the content store holds |
//! | `SDF_IMPORT_MODEL_PATH` | search path for `model://` URIs |
//! | `SDF_IMPORT_SCRATCH_DIR` | directory for converter output |

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

pub const CONVERTER_ENV: &str = "SDF_IMPORT_CONVERTER";
pub const CONVERTER_ARGS_ENV: &str = "SDF_IMPORT_CONVERTER_ARGS";
pub const TARGET_EXT_ENV: &str = "SDF_IMPORT_TARGET_EXT";
pub const MODEL_PATH_ENV: &str = "SDF_IMPORT_MODEL_PATH";
pub const SCRATCH_DIR_ENV: &str = "SDF_IMPORT_SCRATCH_DIR";

/// Interchange format the content store imports directly.
pub const DEFAULT_TARGET_EXTENSION: &str = "fbx";

static CONVERTER: OnceLock<ConverterConfig> = OnceLock::new();

/// Errors in import configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No mesh converter configured: pass --converter or set {}", CONVERTER_ENV)]
    ConverterNotConfigured,

    #[error("Mesh converter not found: {}", .0.display())]
    ConverterNotFound(PathBuf),
}

/// Location and invocation of the external mesh converter.
///
/// The converter is run as `<program> <args...> <source> <output>`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConverterConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub target_extension: String,
}

impl ConverterConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target_extension(mut self, extension: impl Into<String>) -> Self {
        self.target_extension = extension.into();
        self
    }

    /// Read the converter settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let program = env::var_os(CONVERTER_ENV)
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::ConverterNotConfigured)?;

        let mut config = Self::new(program);
        if let Ok(args) = env::var(CONVERTER_ARGS_ENV) {
            config.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Ok(ext) = env::var(TARGET_EXT_ENV) {
            if !ext.trim().is_empty() {
                config.target_extension = ext.trim().trim_start_matches('.').to_string();
            }
        }
        Ok(config)
    }

    /// Check that the converter program exists, resolving bare names on `PATH`.
    ///
    /// Returns the config with `program` replaced by the located path.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.program = locate_program(&self.program)
            .ok_or_else(|| ConfigError::ConverterNotFound(self.program.clone()))?;
        Ok(self)
    }

    /// The process-wide converter config.
    ///
    /// The first call resolves it from `explicit` (or the environment when
    /// `None`) and validates it; later calls return the stored value and
    /// ignore their argument.
    pub fn global(explicit: Option<ConverterConfig>) -> Result<&'static ConverterConfig, ConfigError> {
        if let Some(config) = CONVERTER.get() {
            return Ok(config);
        }

        let config = match explicit {
            Some(config) => config,
            None => Self::from_env()?,
        }
        .validate()?;

        log::info!("Mesh converter: {}", config.program.display());
        Ok(CONVERTER.get_or_init(|| config))
    }
}

/// Settings for one mesh resolution pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolverSettings {
    /// Where converted files are written
    pub scratch_dir: PathBuf,

    /// Extension imported without conversion, and held by the content store
    pub target_extension: String,

    /// Directories searched for `model://<path>` URIs, in order
    pub model_paths: Vec<PathBuf>,

    /// Base for relative mesh paths (usually the SDF file's directory)
    pub base_dir: Option<PathBuf>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            scratch_dir: env::temp_dir().join("sdf_import"),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
            model_paths: Vec::new(),
            base_dir: None,
        }
    }
}

impl ResolverSettings {
    /// Defaults overridden by `SDF_IMPORT_SCRATCH_DIR`, `SDF_IMPORT_MODEL_PATH`
    /// and `SDF_IMPORT_TARGET_EXT`.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(dir) = env::var_os(SCRATCH_DIR_ENV).filter(|d| !d.is_empty()) {
            settings.scratch_dir = PathBuf::from(dir);
        }
        if let Some(paths) = env::var_os(MODEL_PATH_ENV) {
            settings.model_paths = env::split_paths(&paths).collect();
        }
        if let Ok(ext) = env::var(TARGET_EXT_ENV) {
            if !ext.trim().is_empty() {
                settings.target_extension = ext.trim().trim_start_matches('.').to_string();
            }
        }
        settings
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }
}

/// Resolve a program path: paths with a directory part must be files, bare
/// names are searched on `PATH`.
fn locate_program(program: &Path) -> Option<PathBuf> {
    if program.as_os_str().is_empty() {
        return None;
    }

    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }

    let search = env::var_os("PATH")?;
    env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
