pub mod lambda_api;
