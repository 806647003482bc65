use std::path::PathBuf;

use clap::Parser;
use demodata_deploy_core::config::{DeployConfig, DEFAULT_ENV_FILE};
use demodata_deploy_core::orchestrator::{deploy, DeployOutcome};
use tracing::info;

use crate::adapters::lambda_api::AwsLambdaFunctionApi;

#[derive(Debug, Parser)]
#[command(
    name = "demodata-deploy",
    about = "Package the demodata sender and create or update its Lambda function",
    long_about = "Packages lambda_function.py, demodata_sender, libsoratun.so and arc.json\n\
                  into a zip archive, then updates the function code if the function\n\
                  exists or creates it otherwise.\n\n\
                  Deployment options come from PROFILE, REGION, FUNCTION_NAME, ZIP_FILE,\n\
                  RUNTIME, ARCHITECTURE and ROLE_ARN, read from the environment and\n\
                  then from the env file."
)]
pub struct Cli {
    /// Env file with KEY=VALUE deployment options; relative paths resolve
    /// against the working directory
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Directory holding the artifacts and receiving the archive
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,
}

impl Cli {
    pub fn env_file_path(&self) -> PathBuf {
        self.workdir.join(&self.env_file)
    }
}

pub fn run(cli: &Cli) -> Result<DeployOutcome, Box<dyn std::error::Error>> {
    let config = DeployConfig::load(&cli.env_file_path())?;
    info!(
        function = %config.function_name,
        region = %config.region,
        profile = %config.profile,
        "loaded deployment configuration"
    );

    let api = AwsLambdaFunctionApi::connect(&config.profile, &config.region)?;
    Ok(deploy(&config, &cli.workdir, &api)?)
}

pub fn completion_message(outcome: &DeployOutcome) -> String {
    format!(
        "deployed {} ({}) in {} with profile {}",
        outcome.target.name, outcome.action, outcome.target.region, outcome.target.profile
    )
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use demodata_deploy_core::archive::ArchiveSummary;
    use demodata_deploy_core::orchestrator::DeployAction;
    use demodata_deploy_core::remote::FunctionTarget;

    use super::*;

    #[test]
    fn defaults_point_at_current_directory() {
        let cli = Cli::try_parse_from(["demodata-deploy"]).expect("defaults parse");

        assert_eq!(cli.workdir, PathBuf::from("."));
        assert_eq!(cli.env_file_path(), Path::new(".").join(".env"));
    }

    #[test]
    fn relative_env_file_resolves_against_workdir() {
        let cli = Cli::try_parse_from([
            "demodata-deploy",
            "--workdir",
            "build",
            "--env-file",
            "deploy.env",
        ])
        .expect("options parse");

        assert_eq!(cli.env_file_path(), PathBuf::from("build/deploy.env"));
    }

    #[cfg(unix)]
    #[test]
    fn absolute_env_file_is_kept() {
        let cli = Cli::try_parse_from(["demodata-deploy", "--env-file", "/etc/deploy.env"])
            .expect("options parse");

        assert_eq!(cli.env_file_path(), PathBuf::from("/etc/deploy.env"));
    }

    #[test]
    fn completion_message_names_function_region_and_profile() {
        let outcome = DeployOutcome {
            action: DeployAction::Created,
            target: FunctionTarget {
                name: "demodata-sender".to_string(),
                region: "ap-northeast-1".to_string(),
                profile: "soracom-dev".to_string(),
            },
            archive_path: PathBuf::from("lambda.zip"),
            archive: ArchiveSummary {
                entries: 4,
                compressed_bytes: 128,
            },
        };

        assert_eq!(
            completion_message(&outcome),
            "deployed demodata-sender (created) in ap-northeast-1 with profile soracom-dev"
        );
    }
}
