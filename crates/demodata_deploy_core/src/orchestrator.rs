use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::archive::{package_archive, ArchiveSummary};
use crate::artifacts::{validate_artifacts, REQUIRED_ARTIFACTS};
use crate::config::DeployConfig;
use crate::error::{DeployError, PackagingError};
use crate::remote::{
    CreateFunctionRequest, FunctionApi, FunctionPresence, FunctionTarget, FUNCTION_MEMORY_MB,
    FUNCTION_TIMEOUT_SECS, HANDLER_REFERENCE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployAction {
    Created,
    Updated,
}

impl fmt::Display for DeployAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub action: DeployAction,
    pub target: FunctionTarget,
    pub archive_path: PathBuf,
    pub archive: ArchiveSummary,
}

/// Validates, packages, then creates or updates the configured function.
/// Every failure aborts the run; a written archive is left in place.
pub fn deploy(
    config: &DeployConfig,
    workdir: &Path,
    api: &dyn FunctionApi,
) -> Result<DeployOutcome, DeployError> {
    let artifacts = validate_artifacts(workdir, &REQUIRED_ARTIFACTS)?;

    let archive_path = workdir.join(&config.zip_file);
    let archive = package_archive(&archive_path, workdir, &artifacts)?;
    let archive_bytes = fs::read(&archive_path).map_err(|source| DeployError::Packaging {
        archive: archive_path.clone(),
        source: PackagingError::Io(source),
    })?;

    let target = FunctionTarget {
        name: config.function_name.clone(),
        region: config.region.clone(),
        profile: config.profile.clone(),
    };

    let presence = api
        .describe_function(&target)
        .map_err(|message| DeployError::RemoteQuery {
            function: target.name.clone(),
            message,
        })?;

    let action = match presence {
        FunctionPresence::Exists => {
            info!(function = %target.name, "function exists, updating code");
            api.update_function_code(&target, &archive_bytes)
                .map_err(|message| DeployError::RemoteUpdate {
                    function: target.name.clone(),
                    message,
                })?;
            DeployAction::Updated
        }
        FunctionPresence::NotFound => {
            if config.role_arn.is_empty() {
                error!(function = %target.name, "function does not exist and ROLE_ARN is empty");
                return Err(DeployError::MissingRole(target.name));
            }
            info!(
                function = %target.name,
                role_arn = %config.role_arn,
                "function not found, creating"
            );
            let request = CreateFunctionRequest {
                target: target.clone(),
                runtime: config.runtime.clone(),
                handler: HANDLER_REFERENCE.to_string(),
                role_arn: config.role_arn.clone(),
                architecture: config.architecture.clone(),
                timeout_secs: FUNCTION_TIMEOUT_SECS,
                memory_mb: FUNCTION_MEMORY_MB,
            };
            api.create_function(&request, &archive_bytes)
                .map_err(|message| DeployError::RemoteCreate {
                    function: target.name.clone(),
                    message,
                })?;
            DeployAction::Created
        }
    };

    info!(
        function = %target.name,
        region = %target.region,
        profile = %target.profile,
        action = %action,
        "deployment finished"
    );

    Ok(DeployOutcome {
        action,
        target,
        archive_path,
        archive,
    })
}
