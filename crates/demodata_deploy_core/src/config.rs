//! Deployment settings resolved from the process environment and an
//! optional `KEY=VALUE` env file.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{DeployError, Result};

pub const DEFAULT_ENV_FILE: &str = ".env";

pub const DEFAULT_PROFILE: &str = "soracom-dev";
pub const DEFAULT_REGION: &str = "ap-northeast-1";
pub const DEFAULT_FUNCTION_NAME: &str = "demodata-sender";
pub const DEFAULT_ZIP_FILE: &str = "lambda.zip";
pub const DEFAULT_RUNTIME: &str = "python3.12";
pub const DEFAULT_ARCHITECTURE: &str = "arm64";

const RECOGNIZED_KEYS: [&str; 7] = [
    "PROFILE",
    "REGION",
    "FUNCTION_NAME",
    "ZIP_FILE",
    "RUNTIME",
    "ARCHITECTURE",
    "ROLE_ARN",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub profile: String,
    pub region: String,
    pub function_name: String,
    pub zip_file: String,
    pub runtime: String,
    pub architecture: String,
    /// Empty when unset. Only required when the function has to be created.
    pub role_arn: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            region: DEFAULT_REGION.to_string(),
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            zip_file: DEFAULT_ZIP_FILE.to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
            architecture: DEFAULT_ARCHITECTURE.to_string(),
            role_arn: String::new(),
        }
    }
}

impl DeployConfig {
    /// Reads the env file at `env_file` (if present) and layers the real
    /// process environment on top of it.
    pub fn load(env_file: &Path) -> Result<Self> {
        let file = parse_env_file(env_file)?;
        Ok(Self::resolve(file.as_ref(), |key| std::env::var(key).ok()))
    }

    /// Per option: environment, then env file, then default. Empty values
    /// count as unset.
    pub fn resolve(file: Option<&EnvFile>, env: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(file) = file {
            for (key, _) in file.entries() {
                if !RECOGNIZED_KEYS.contains(&key.as_str()) {
                    debug!(key = %key, "ignoring unrecognized env file key");
                }
            }
        }

        let lookup = |key: &str, default: &str| -> String {
            env(key)
                .filter(|value| !value.is_empty())
                .or_else(|| {
                    file.and_then(|file| file.get(key))
                        .filter(|value| !value.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            profile: lookup("PROFILE", DEFAULT_PROFILE),
            region: lookup("REGION", DEFAULT_REGION),
            function_name: lookup("FUNCTION_NAME", DEFAULT_FUNCTION_NAME),
            zip_file: lookup("ZIP_FILE", DEFAULT_ZIP_FILE),
            runtime: lookup("RUNTIME", DEFAULT_RUNTIME),
            architecture: lookup("ARCHITECTURE", DEFAULT_ARCHITECTURE),
            role_arn: lookup("ROLE_ARN", ""),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (index, raw_line) in contents.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return Err(DeployError::InvalidEnvFile {
                    path: path.to_path_buf(),
                    line: index + 1,
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(DeployError::InvalidEnvFile {
                    path: path.to_path_buf(),
                    line: index + 1,
                });
            }

            entries.push((key.to_string(), parse_value(value).to_string()));
        }
        Ok(Self { entries })
    }

    /// Last assignment wins, as when the file is sourced by a shell.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = &(String, String)> {
        self.entries.iter()
    }
}

/// Returns `Ok(None)` when there is no file at `path`.
pub fn parse_env_file(path: &Path) -> Result<Option<EnvFile>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no env file, using environment and defaults");
            return Ok(None);
        }
        Err(source) => {
            return Err(DeployError::EnvFileRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let file = EnvFile::parse(path, &contents)?;
    debug!(path = %path.display(), entries = file.entries.len(), "loaded env file");
    Ok(Some(file))
}

/// A quoted value ends at its closing quote. An unquoted value ends at a `#`
/// that starts a word, as in a shell.
fn parse_value(raw: &str) -> &str {
    let leading = raw.trim_start();
    for quote in ['"', '\''] {
        if let Some(rest) = leading.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                return &rest[..end];
            }
        }
    }

    let end = raw
        .char_indices()
        .find(|&(index, ch)| ch == '#' && raw[..index].ends_with(char::is_whitespace))
        .map_or(raw.len(), |(index, _)| index);
    raw[..end].trim()
}
