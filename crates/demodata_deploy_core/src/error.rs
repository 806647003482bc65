use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("failed to read env file {path}: {source}")]
    EnvFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid env file {path}: line {line} is not KEY=VALUE")]
    InvalidEnvFile { path: PathBuf, line: usize },

    #[error("required artifact not found: {0}")]
    MissingArtifact(PathBuf),

    #[error("failed to package archive {archive}: {source}")]
    Packaging {
        archive: PathBuf,
        #[source]
        source: PackagingError,
    },

    #[error("failed to query function '{function}': {message}")]
    RemoteQuery { function: String, message: String },

    #[error("ROLE_ARN must be set to create function '{0}'")]
    MissingRole(String),

    #[error("failed to create function '{function}': {message}")]
    RemoteCreate { function: String, message: String },

    #[error("failed to update code of function '{function}': {message}")]
    RemoteUpdate { function: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PackagingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error("archive {archive} would overwrite required artifact {artifact}")]
    OverlapsArtifact { archive: PathBuf, artifact: PathBuf },

    #[error("path {0} is outside the working directory")]
    OutsideWorkdir(PathBuf),
}

pub type Result<T> = std::result::Result<T, DeployError>;
