use csvv::logging::init_logging;

#[test]
fn logs_go_to_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("csvv.log");
    init_logging(&log_file, "debug").unwrap();
    tracing::warn!("export target unavailable");
    let content = std::fs::read_to_string(&log_file).unwrap();
    assert!(content.contains("export target unavailable"));

    // A second subscriber can not be installed.
    assert!(init_logging(&log_file, "debug").is_err());
}
