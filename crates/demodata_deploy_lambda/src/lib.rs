//! AWS Lambda adapter and command-line surface for the demodata deployer.
//!
//! Packaging and the create-or-update decision live in
//! `demodata_deploy_core`; this crate supplies the `aws-sdk-lambda` backed
//! [`adapters::lambda_api::AwsLambdaFunctionApi`] and the CLI wiring.

pub mod adapters;
pub mod cli;
