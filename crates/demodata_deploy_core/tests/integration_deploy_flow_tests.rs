use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use demodata_deploy_core::artifacts::{NATIVE_LIBRARY, REQUIRED_ARTIFACTS};
use demodata_deploy_core::config::{DeployConfig, EnvFile};
use demodata_deploy_core::orchestrator::{deploy, DeployAction};
use demodata_deploy_core::remote::{
    CreateFunctionRequest, FunctionApi, FunctionPresence, FunctionTarget,
};
use demodata_deploy_core::DeployError;
use zip::ZipArchive;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Describe(FunctionTarget),
    Update { target: FunctionTarget, archive_len: usize },
    Create(CreateFunctionRequest),
}

struct CapturingApi {
    presence: FunctionPresence,
    remote_failure: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl CapturingApi {
    fn new(presence: FunctionPresence) -> Self {
        Self {
            presence,
            remote_failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Update and create both fail with `message`.
    fn rejecting_writes(presence: FunctionPresence, message: &str) -> Self {
        Self {
            remote_failure: Some(message.to_string()),
            ..Self::new(presence)
        }
    }

    fn write_result(&self) -> Result<(), String> {
        match &self.remote_failure {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    fn creates(&self) -> Vec<CreateFunctionRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}

impl FunctionApi for CapturingApi {
    fn describe_function(&self, target: &FunctionTarget) -> Result<FunctionPresence, String> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(Call::Describe(target.clone()));
        Ok(self.presence)
    }

    fn update_function_code(&self, target: &FunctionTarget, archive: &[u8]) -> Result<(), String> {
        self.calls.lock().expect("poisoned mutex").push(Call::Update {
            target: target.clone(),
            archive_len: archive.len(),
        });
        self.write_result()
    }

    fn create_function(
        &self,
        request: &CreateFunctionRequest,
        _archive: &[u8],
    ) -> Result<(), String> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(Call::Create(request.clone()));
        self.write_result()
    }
}

fn seed_artifacts(dir: &Path) {
    fs::write(dir.join("lambda_function.py"), b"def lambda_handler(event, context):\n")
        .expect("write handler");
    fs::create_dir_all(dir.join("demodata_sender")).expect("create sender");
    fs::write(dir.join("demodata_sender/__init__.py"), b"").expect("write init");
    fs::write(dir.join("demodata_sender/generator.py"), b"def generate_payload(): ...\n")
        .expect("write generator");
    fs::write(dir.join("libsoratun.so"), b"\x7fELF").expect("write library");
    fs::write(dir.join("arc.json"), b"{\"arcServerEndpoint\": \"\"}").expect("write arc");
}

fn top_level_entries(archive_path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(archive_path).expect("open")).expect("read zip");
    let mut names: Vec<String> = archive
        .file_names()
        .filter_map(|name| name.split('/').next())
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();
    names
}

fn config_with_role() -> DeployConfig {
    let file = EnvFile::parse(Path::new(".env"), "ROLE_ARN=arn:aws:iam::123:role/x\n")
        .expect("env file");
    DeployConfig::resolve(Some(&file), |_| None)
}

#[test]
fn creates_missing_function_with_fixed_limits() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    let api = CapturingApi::new(FunctionPresence::NotFound);

    let outcome = deploy(&config_with_role(), dir.path(), &api).expect("create succeeds");

    assert_eq!(outcome.action, DeployAction::Created);
    let creates = api.creates();
    assert_eq!(creates.len(), 1);
    let request = &creates[0];
    assert_eq!(request.timeout_secs, 30);
    assert_eq!(request.memory_mb, 256);
    assert_eq!(request.architecture, "arm64");
    assert_eq!(request.runtime, "python3.12");
    assert_eq!(request.handler, "lambda_function.lambda_handler");
    assert_eq!(request.role_arn, "arn:aws:iam::123:role/x");
    assert_eq!(
        request.target,
        FunctionTarget {
            name: "demodata-sender".to_string(),
            region: "ap-northeast-1".to_string(),
            profile: "soracom-dev".to_string(),
        }
    );
}

#[test]
fn existing_function_gets_exactly_one_code_update() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    let api = CapturingApi::new(FunctionPresence::Exists);

    let outcome = deploy(&config_with_role(), dir.path(), &api).expect("update succeeds");

    assert_eq!(outcome.action, DeployAction::Updated);
    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], Call::Describe(_)));
    match &calls[1] {
        Call::Update {
            target,
            archive_len,
        } => {
            assert_eq!(target.name, "demodata-sender");
            let on_disk = fs::metadata(&outcome.archive_path).expect("archive").len();
            assert_eq!(*archive_len as u64, on_disk);
        }
        other => panic!("expected update, got {other:?}"),
    }
    assert!(api.creates().is_empty());
}

#[test]
fn missing_native_library_makes_no_remote_calls_and_no_archive() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    fs::remove_file(dir.path().join(NATIVE_LIBRARY)).expect("remove library");
    let api = CapturingApi::new(FunctionPresence::Exists);

    let error = deploy(&config_with_role(), dir.path(), &api).expect_err("library is missing");

    assert!(matches!(error, DeployError::MissingArtifact(_)));
    assert!(error.to_string().contains("libsoratun.so"));
    assert!(api.calls().is_empty());
    assert!(!dir.path().join("lambda.zip").exists());
}

#[test]
fn missing_artifact_leaves_existing_archive_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    fs::remove_file(dir.path().join("arc.json")).expect("remove arc config");
    fs::write(dir.path().join("lambda.zip"), b"previous build").expect("write old archive");
    let api = CapturingApi::new(FunctionPresence::Exists);

    deploy(&config_with_role(), dir.path(), &api).expect_err("arc config is missing");

    let contents = fs::read(dir.path().join("lambda.zip")).expect("old archive");
    assert_eq!(contents, b"previous build");
}

#[test]
fn missing_role_with_absent_function_never_calls_create() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    let api = CapturingApi::new(FunctionPresence::NotFound);

    let error = deploy(&DeployConfig::default(), dir.path(), &api).expect_err("no role");

    assert!(matches!(error, DeployError::MissingRole(_)));
    assert!(api.creates().is_empty());
}

#[test]
fn repeated_runs_produce_the_same_top_level_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    let api = CapturingApi::new(FunctionPresence::Exists);
    let config = config_with_role();

    let first = deploy(&config, dir.path(), &api).expect("first run");
    let first_entries = top_level_entries(&first.archive_path);
    let second = deploy(&config, dir.path(), &api).expect("second run");
    let second_entries = top_level_entries(&second.archive_path);

    let mut expected: Vec<String> = REQUIRED_ARTIFACTS.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(first_entries, expected);
    assert_eq!(second_entries, expected);
    assert_eq!(first.archive.entries, second.archive.entries);
}

#[test]
fn rejected_update_fails_the_run_without_creating() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    let api =
        CapturingApi::rejecting_writes(FunctionPresence::Exists, "ResourceConflictException");

    let error = deploy(&config_with_role(), dir.path(), &api).expect_err("update rejected");

    assert!(matches!(
        error,
        DeployError::RemoteUpdate { ref function, ref message }
            if function == "demodata-sender" && message == "ResourceConflictException"
    ));
    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[1], Call::Update { .. }));
    assert!(api.creates().is_empty());
}

#[test]
fn rejected_create_fails_the_run_after_a_single_attempt() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    let api = CapturingApi::rejecting_writes(FunctionPresence::NotFound, "ServiceException");

    let error = deploy(&config_with_role(), dir.path(), &api).expect_err("create rejected");

    assert!(matches!(
        error,
        DeployError::RemoteCreate { ref function, .. } if function == "demodata-sender"
    ));
    assert_eq!(api.calls().len(), 2);
    assert_eq!(api.creates().len(), 1);
}

#[test]
fn zip_file_naming_an_artifact_is_rejected_before_any_remote_call() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_artifacts(dir.path());
    let api = CapturingApi::new(FunctionPresence::Exists);
    let config = DeployConfig {
        zip_file: NATIVE_LIBRARY.to_string(),
        ..config_with_role()
    };

    let error = deploy(&config, dir.path(), &api).expect_err("archive would replace the library");

    assert!(matches!(error, DeployError::Packaging { .. }));
    assert!(error.to_string().contains("libsoratun.so"));
    assert!(api.calls().is_empty());
    let library = fs::read(dir.path().join(NATIVE_LIBRARY)).expect("library survives");
    assert_eq!(library, b"\x7fELF");
}
