// tests/config_load.rs
use p2000_monitor::config::{ENV_CONFIG_PATH, ENV_HOME_LATITUDE, ENV_HOME_LONGITUDE};
use p2000_monitor::{FeedVariant, MonitorConfig};
use std::{env, fs};

#[test]
fn toml_and_json_files_load() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("p2000.toml");
    fs::write(
        &p_toml,
        r#"
name = "P2000 Amsterdam"
regions = "13"
disciplines = "1,2"
capcodes = "1301001, 1301999"
contains = "Damrak"
radius = 2500
allow_no_location = true
latitude = 52.3731
longitude = 4.8926
"#,
    )
    .unwrap();
    let cfg = MonitorConfig::load_from(&p_toml).unwrap();
    assert_eq!(cfg.name, "P2000 Amsterdam");
    assert_eq!(cfg.capcodes, vec!["1301001", "1301999"]);
    assert_eq!(cfg.contains.as_deref(), Some("Damrak"));

    let criteria = cfg.criteria().unwrap();
    assert_eq!(criteria.radius_meters, Some(2500.0));
    assert!(criteria.allow_no_location);
    assert!(criteria.regions.contains("13"));

    let p_json = dir.path().join("p2000.json");
    fs::write(
        &p_json,
        r#"{"variant":"structured","regions":["01","2"],"radius":0,"latitude":53.2,"longitude":6.56}"#,
    )
    .unwrap();
    let cfg = MonitorConfig::load_from(&p_json).unwrap();
    assert_eq!(cfg.variant, FeedVariant::Structured);
    let criteria = cfg.criteria().unwrap();
    assert_eq!(criteria.radius_meters, None);
    assert!(criteria.regions.contains("1"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the test never reads a real config/ directory
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);

    // 1) nothing on disk -> defaults
    let v = MonitorConfig::load_default().unwrap();
    assert_eq!(v, MonitorConfig::default());

    // 2) fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("p2000.toml"), r#"name = "from-toml""#).unwrap();
    assert_eq!(MonitorConfig::load_default().unwrap().name, "from-toml");

    // 3) env path wins
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"name":"from-env"}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(MonitorConfig::load_default().unwrap().name, "from-env");

    // 4) env path to nowhere is an error, not a silent default
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(MonitorConfig::load_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn observer_defaults_to_home_location() {
    env::set_var(ENV_HOME_LATITUDE, "52.0907");
    env::set_var(ENV_HOME_LONGITUDE, " 5.1214 ");
    let p = MonitorConfig::default().reference_point().unwrap();
    assert_eq!((p.latitude, p.longitude), (52.0907, 5.1214));

    env::set_var(ENV_HOME_LONGITUDE, "oost");
    assert!(MonitorConfig::default().reference_point().is_err());

    env::remove_var(ENV_HOME_LATITUDE);
    env::remove_var(ENV_HOME_LONGITUDE);
    assert!(MonitorConfig::default().build_session().is_err());
}
