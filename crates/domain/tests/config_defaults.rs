use cs_domain::config::Config;

#[test]
fn empty_toml_yields_working_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.timeout_ms, 30_000);
    assert!(config.analysis.incremental);
}

#[test]
fn base_url_parses_from_toml() {
    let toml_str = r#"
[llm]
base_url = "http://10.0.0.4:8080"
model = "gpt-4o"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.llm.base_url, "http://10.0.0.4:8080");
    assert_eq!(config.llm.model, "gpt-4o");
}

#[test]
fn incremental_extraction_can_be_disabled() {
    let toml_str = r#"
[analysis]
incremental = false
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(!config.analysis.incremental);
}

#[test]
fn state_path_parses_from_toml() {
    let toml_str = r#"
[storage]
state_path = "/var/lib/callsim"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(
        config.storage.state_path,
        std::path::PathBuf::from("/var/lib/callsim")
    );
}
