use staticd::logging;

// The subscriber is process-global, so this binary holds a single test.
#[test]
fn test_log_file_receives_events_without_colour() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staticd.log");

    logging::init(Some(&path)).unwrap();
    tracing::info!(target: "access", "127.0.0.1 - - [x] \"GET /\" 200 5");
    tracing::warn!(peer = "127.0.0.1:9", "Something odd");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("INFO"));
    assert!(text.contains("\"GET /\" 200 5"));
    assert!(text.contains("Something odd"));
    assert!(text.contains("peer=\"127.0.0.1:9\""));
    assert!(!text.contains('\u{1b}'));

    assert!(logging::init(None).is_err());
}
