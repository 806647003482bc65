use aws_sdk_lambda::config::Region;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{Architecture, FunctionCode, Runtime};
use demodata_deploy_core::remote::{
    CreateFunctionRequest, FunctionApi, FunctionPresence, FunctionTarget,
};
use tracing::debug;

/// Blocking [`FunctionApi`] over `aws-sdk-lambda`. Each call drives its own
/// current-thread runtime to completion.
pub struct AwsLambdaFunctionApi {
    runtime: tokio::runtime::Runtime,
    lambda_client: aws_sdk_lambda::Client,
}

impl AwsLambdaFunctionApi {
    /// Builds a client for the named shared-config profile and region.
    /// Credentials are resolved lazily on the first request.
    pub fn connect(profile: &str, region: &str) -> std::io::Result<Self> {
        let runtime = current_thread_runtime()?;
        let sdk_config = runtime.block_on(
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .profile_name(profile)
                .region(Region::new(region.to_string()))
                .load(),
        );

        Ok(Self {
            runtime,
            lambda_client: aws_sdk_lambda::Client::new(&sdk_config),
        })
    }

    pub fn with_client(lambda_client: aws_sdk_lambda::Client) -> std::io::Result<Self> {
        Ok(Self {
            runtime: current_thread_runtime()?,
            lambda_client,
        })
    }
}

fn current_thread_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

impl FunctionApi for AwsLambdaFunctionApi {
    fn describe_function(&self, target: &FunctionTarget) -> Result<FunctionPresence, String> {
        let client = self.lambda_client.clone();
        let function_name = target.name.clone();

        self.runtime.block_on(async move {
            match client.get_function().function_name(function_name).send().await {
                Ok(output) => {
                    debug!(
                        function_arn = output
                            .configuration()
                            .and_then(|configuration| configuration.function_arn())
                            .unwrap_or_default(),
                        "function found"
                    );
                    Ok(FunctionPresence::Exists)
                }
                Err(error)
                    if error
                        .as_service_error()
                        .is_some_and(|service| service.is_resource_not_found_exception()) =>
                {
                    Ok(FunctionPresence::NotFound)
                }
                Err(error) => Err(format!(
                    "failed to get function: {}",
                    DisplayErrorContext(&error)
                )),
            }
        })
    }

    fn update_function_code(&self, target: &FunctionTarget, archive: &[u8]) -> Result<(), String> {
        let client = self.lambda_client.clone();
        let function_name = target.name.clone();
        let zip_file = Blob::new(archive.to_vec());

        self.runtime.block_on(async move {
            client
                .update_function_code()
                .function_name(function_name)
                .zip_file(zip_file)
                .send()
                .await
                .map(|output| {
                    debug!(
                        code_sha256 = output.code_sha256().unwrap_or_default(),
                        "function code updated"
                    );
                })
                .map_err(|error| {
                    format!(
                        "failed to update function code: {}",
                        DisplayErrorContext(&error)
                    )
                })
        })
    }

    fn create_function(
        &self,
        request: &CreateFunctionRequest,
        archive: &[u8],
    ) -> Result<(), String> {
        let client = self.lambda_client.clone();
        let request = request.clone();
        let code = FunctionCode::builder()
            .zip_file(Blob::new(archive.to_vec()))
            .build();

        self.runtime.block_on(async move {
            client
                .create_function()
                .function_name(request.target.name)
                .runtime(Runtime::from(request.runtime.as_str()))
                .handler(request.handler)
                .role(request.role_arn)
                .architectures(Architecture::from(request.architecture.as_str()))
                .timeout(request.timeout_secs)
                .memory_size(request.memory_mb)
                .code(code)
                .send()
                .await
                .map(|output| {
                    debug!(
                        function_arn = output.function_arn().unwrap_or_default(),
                        "function created"
                    );
                })
                .map_err(|error| {
                    format!("failed to create function: {}", DisplayErrorContext(&error))
                })
        })
    }
}
