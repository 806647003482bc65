pub const HANDLER_REFERENCE: &str = "lambda_function.lambda_handler";
pub const FUNCTION_TIMEOUT_SECS: i32 = 30;
pub const FUNCTION_MEMORY_MB: i32 = 256;

/// A function resource addressed within a (profile, region) scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTarget {
    pub name: String,
    pub region: String,
    pub profile: String,
}

/// Outcome of the existence query. Failures that are not a confirmed
/// not-found are reported as `Err` by [`FunctionApi::describe_function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionPresence {
    Exists,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFunctionRequest {
    pub target: FunctionTarget,
    pub runtime: String,
    pub handler: String,
    pub role_arn: String,
    pub architecture: String,
    pub timeout_secs: i32,
    pub memory_mb: i32,
}

pub trait FunctionApi {
    fn describe_function(&self, target: &FunctionTarget) -> Result<FunctionPresence, String>;

    fn update_function_code(&self, target: &FunctionTarget, archive: &[u8]) -> Result<(), String>;

    fn create_function(&self, request: &CreateFunctionRequest, archive: &[u8])
        -> Result<(), String>;
}
