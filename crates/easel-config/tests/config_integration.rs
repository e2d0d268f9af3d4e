use easel_config::EaselConfig;

#[test]
fn test_load_creates_default_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("easel.json");
    assert!(!path.exists());

    let config = EaselConfig::load_or_create(&path);
    assert!(path.exists());
    assert_eq!(config.max_history_size, 50);

    // File should contain valid JSON
    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert!(parsed.is_object());
    assert_eq!(parsed["auto_save_interval_secs"], 30);
}

#[test]
fn test_load_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("easel.json");
    let json = r#"{
        "max_history_size": 200,
        "auto_save_enabled": false,
        "auto_save_interval_secs": 90,
        "max_recent_projects": 5,
        "data_dir": "/var/lib/easel"
    }"#;
    std::fs::write(&path, json).unwrap();

    let config = EaselConfig::load_or_create(&path);
    assert_eq!(config.max_history_size, 200);
    assert!(!config.auto_save_enabled);
    assert_eq!(config.auto_save_interval_secs, 90);
    assert_eq!(config.max_recent_projects, 5);
    assert_eq!(config.data_dir().to_str(), Some("/var/lib/easel"));
}

#[test]
fn test_broken_json_returns_defaults_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("easel.json");
    std::fs::write(&path, "{ this is not valid json }}}").unwrap();

    let config = EaselConfig::load_or_create(&path);
    assert_eq!(config.max_history_size, 50);
    assert!(config.auto_save_enabled);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "{ this is not valid json }}}");
}

#[test]
fn test_loaded_config_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("easel.json");
    std::fs::write(
        &path,
        r#"{"auto_save_interval_secs": 0, "max_recent_projects": 0}"#,
    )
    .unwrap();

    let config = EaselConfig::load_or_create(&path);
    assert_eq!(config.auto_save_interval_secs, 5);
    assert_eq!(config.max_recent_projects, 1);
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("easel.json");

    let mut config = EaselConfig::default();
    config.max_history_size = 12;
    config.auto_save_interval_secs = 45;
    config.save(&path).unwrap();

    let loaded = EaselConfig::load_or_create(&path);
    assert_eq!(loaded.max_history_size, 12);
    assert_eq!(loaded.auto_save_interval_secs, 45);
}
