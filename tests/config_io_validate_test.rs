use kairos::config::Config;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.vehicle.vin = "WBA12345678901234".to_string();
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.vehicle.vin, "WBA12345678901234");
    assert_eq!(loaded.logging.file, cfg.logging.file);
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();
    cfg.vehicle.vin = "WBA12345678901234".to_string();

    // Empty base URL
    cfg.vehicle.base_url.clear();
    assert!(cfg.validate().is_err());

    // Empty VIN
    cfg = Config::default();
    assert!(cfg.validate().is_err());

    // Non-positive window
    cfg = Config::default();
    cfg.vehicle.vin = "WBA12345678901234".to_string();
    cfg.window.min_charge_hours = 0.0;
    assert!(cfg.validate().is_err());

    // Inverted window
    cfg = Config::default();
    cfg.vehicle.vin = "WBA12345678901234".to_string();
    cfg.window.max_charge_hours = cfg.window.min_charge_hours;
    assert!(cfg.validate().is_err());

    // SoC bound off the 5% grid
    cfg = Config::default();
    cfg.vehicle.vin = "WBA12345678901234".to_string();
    cfg.soc.min_target_soc = 52;
    assert!(cfg.validate().is_err());

    // Inverted SoC bounds
    cfg = Config::default();
    cfg.vehicle.vin = "WBA12345678901234".to_string();
    cfg.soc.min_target_soc = 70;
    cfg.soc.max_target_soc = 50;
    assert!(cfg.validate().is_err());

    // Tick interval zero
    cfg = Config::default();
    cfg.vehicle.vin = "WBA12345678901234".to_string();
    cfg.tick_interval_secs = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}
