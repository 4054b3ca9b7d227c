// tests/config_loading.rs
use profit_router::config::{
    AppConfig, ENV_CONFIG_PATH, ENV_COUNTRY, ENV_EXPORT_DIR, ENV_LANGUAGE, ENV_SCHEDULE_SECS,
};
use profit_router::topic::{load_topics_default, load_topics_from, ENV_TOPICS_PATH};
use profit_router::Tier;
use std::{env, fs};

#[test]
fn load_from_file_normalizes_market() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("profit.toml");
    fs::write(
        &p,
        r#"
export_dir = "out"

[engine]
language = "EN"
country = "uk"

[scheduler]
interval_secs = 600
max_runs = 2
"#,
    )
    .unwrap();

    let cfg = AppConfig::load_from_file(&p).unwrap();
    assert_eq!(cfg.engine.language, "en");
    assert_eq!(cfg.engine.country, "UK");
    assert_eq!(cfg.scheduler.interval_secs, Some(600));
    assert_eq!(cfg.export_dir.as_deref(), Some(std::path::Path::new("out")));

    let engine = cfg.build_engine();
    assert_eq!(engine.estimator().base_cpc("en", "UK"), 2.0);
}

#[test]
fn bad_toml_is_an_error_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("broken.toml");
    fs::write(&p, "router = [").unwrap();
    let err = AppConfig::load_from_file(&p).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_COUNTRY);
    env::remove_var(ENV_SCHEDULE_SECS);
    env::remove_var(ENV_LANGUAGE);
    env::remove_var(ENV_EXPORT_DIR);

    // 1) Nothing → defaults
    assert_eq!(AppConfig::load_default().unwrap(), AppConfig::default());

    // 2) config/profit.toml
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/profit.toml"),
        "[engine]\nforce_tier = \"enhanced\"\n",
    )
    .unwrap();
    assert_eq!(
        AppConfig::load_default().unwrap().engine.force_tier,
        Some(Tier::Enhanced)
    );

    // 3) Env path wins; field overrides apply on top
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, "history_capacity = 7\n").unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    env::set_var(ENV_COUNTRY, "ca");
    env::set_var(ENV_SCHEDULE_SECS, "30");
    let cfg = AppConfig::load_default().unwrap();
    assert_eq!(cfg.history_capacity, 7);
    assert_eq!(cfg.engine.force_tier, None);
    assert_eq!(cfg.engine.country, "CA");
    assert_eq!(cfg.scheduler.interval_secs, Some(30));

    // 4) Env path to nowhere → error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(AppConfig::load_default().is_err());

    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_COUNTRY);
    env::remove_var(ENV_SCHEDULE_SECS);
    env::set_current_dir(&old).unwrap();
}

#[test]
fn topic_files_in_both_formats() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("topics.toml");
    fs::write(
        &p_toml,
        r#"
[[topics]]
topic = " Budget Travel Hacks "
category = "lifestyle"

[[topics]]
topic = "Budget Travel Hacks"
"#,
    )
    .unwrap();
    let v = load_topics_from(&p_toml).unwrap();
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].topic, "Budget Travel Hacks");
    assert_eq!(v[0].category, "lifestyle");

    let p_json = dir.path().join("topics.json");
    fs::write(&p_json, r#"[{"topic":"Index Funds","category":"finance"},{"topic":"?"}]"#).unwrap();
    let vj = load_topics_from(&p_json).unwrap();
    assert_eq!(vj.len(), 1);
    assert_eq!(vj[0].category, "finance");
}

#[serial_test::serial]
#[test]
fn topics_env_path_wins_over_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("fallback.json");
    fs::write(&fallback, r#"[{"topic":"From Fallback"}]"#).unwrap();
    let from_env = dir.path().join("env.json");
    fs::write(&from_env, r#"[{"topic":"From Env"}]"#).unwrap();

    env::remove_var(ENV_TOPICS_PATH);
    assert_eq!(load_topics_default(Some(fallback.as_path())).unwrap()[0].topic, "From Fallback");
    assert!(load_topics_default(None).unwrap().is_empty());

    env::set_var(ENV_TOPICS_PATH, from_env.display().to_string());
    assert_eq!(load_topics_default(Some(fallback.as_path())).unwrap()[0].topic, "From Env");
    env::remove_var(ENV_TOPICS_PATH);
}
