//! Layered configuration loading from files on disk.

use std::io::Write;
use touchline_bot::TouchlineConfig;

#[test]
fn test_explicit_file_overrides_bundled_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[bot]
dry_run = true
skip_rate = 0.3
target_accounts = ["Alhilal_FC"]

[governor]
max_per_day = 12
"#
    )
    .unwrap();

    let config = TouchlineConfig::load(Some(file.path())).unwrap();

    assert!(config.bot.dry_run);
    assert_eq!(config.bot.skip_rate, 0.3);
    assert_eq!(config.bot.target_accounts, vec!["Alhilal_FC".to_string()]);
    assert_eq!(config.governor.max_per_day, 12);
    assert_eq!(config.governor.max_per_hour, 6);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(TouchlineConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_serialized_config_loads_back() {
    let mut original = TouchlineConfig::default();
    original.bot.poll_interval_secs = 240;
    original.governor.min_gap_secs = 720;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(toml::to_string(&original).unwrap().as_bytes())
        .unwrap();

    let loaded = TouchlineConfig::load(Some(file.path())).unwrap();

    assert_eq!(loaded.bot, original.bot);
    assert_eq!(loaded.governor, original.governor);
}

#[test]
fn test_invalid_file_names_the_section() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[bot]\nskip_rate = 1.5").unwrap();

    let err = TouchlineConfig::load(Some(file.path())).unwrap_err();

    assert!(err.to_string().contains("[bot]"));
}
