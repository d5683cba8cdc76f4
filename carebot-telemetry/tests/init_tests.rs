use carebot_telemetry::{DeployEnv, LoggingConfig, TelemetryError, init_logging};

// The global subscriber can be installed once per process, so both calls
// live in one test.
#[test]
fn init_installs_once_and_writes_to_the_folder() {
    let temp = tempfile::tempdir().unwrap();
    let config = LoggingConfig::default().with_log_dir(temp.path()).with_deploy_env(DeployEnv::Prod);

    let guard = init_logging(&config).unwrap();
    assert_eq!(guard.directory(), config.directory());
    tracing::info!("first line");

    let err = init_logging(&config).unwrap_err();
    assert!(matches!(err, TelemetryError::Subscriber(_)));

    drop(guard);
    let entries = std::fs::read_dir(config.directory()).unwrap().count();
    assert!(entries >= 1);
}
