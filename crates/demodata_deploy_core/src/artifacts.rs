use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::{DeployError, Result};

pub const HANDLER_FILE: &str = "lambda_function.py";
pub const SENDER_MODULE: &str = "demodata_sender";
pub const NATIVE_LIBRARY: &str = "libsoratun.so";
pub const ARC_CONFIG_FILE: &str = "arc.json";

/// Everything the packaged handler needs at invocation time, in archive order.
pub const REQUIRED_ARTIFACTS: [&str; 4] =
    [HANDLER_FILE, SENDER_MODULE, NATIVE_LIBRARY, ARC_CONFIG_FILE];

/// Resolves each name against `workdir` and fails on the first one that does
/// not exist. Nothing is written.
pub fn validate_artifacts(workdir: &Path, names: &[&str]) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let path = workdir.join(name);
        if !path.exists() {
            error!(artifact = %name, path = %path.display(), "required artifact is missing");
            return Err(DeployError::MissingArtifact(path));
        }
        debug!(artifact = %name, "found artifact");
        resolved.push(path);
    }
    Ok(resolved)
}
