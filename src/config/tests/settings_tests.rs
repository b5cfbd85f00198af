use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::settings::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| values.get(key).cloned()
}

#[test]
fn test_defaults() {
    let settings = Settings::default();

    assert_eq!(settings.states_dir, PathBuf::from("./states"));
    assert_eq!(settings.keylayouts_dir, PathBuf::from("./keylayouts"));
    assert_eq!(settings.keylayouts_file_suffix, "yaml");
    assert_eq!(settings.default_output_path, PathBuf::from("./a.keylayout"));
    assert_eq!(settings.output_delimiter, ",");
    assert_eq!(settings.default_terminator, " ");
    assert_eq!(settings.version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_empty_lookup_gives_defaults() {
    assert_eq!(Settings::from_lookup(|_| None), Settings::default());
}

#[test]
fn test_overrides() {
    let settings = Settings::from_lookup(lookup(&[
        (ENV_STATES_DIR, "/opt/states"),
        (ENV_KEYLAYOUTS_DIR, "/opt/layouts"),
        (ENV_KEYLAYOUTS_SUFFIX, ".yml"),
        (ENV_OUTPUT_PATH, "/tmp/out.keylayout"),
        (ENV_OUTPUT_DELIMITER, ";"),
        (ENV_DEFAULT_TERMINATOR, "·"),
    ]));

    assert_eq!(settings.states_dir, PathBuf::from("/opt/states"));
    assert_eq!(settings.keylayouts_dir, PathBuf::from("/opt/layouts"));
    assert_eq!(settings.keylayouts_file_suffix, "yml", "Leading dot is dropped");
    assert_eq!(settings.default_output_path, PathBuf::from("/tmp/out.keylayout"));
    assert_eq!(settings.output_delimiter, ";");
    assert_eq!(settings.default_terminator, "·");
}

#[test]
fn test_empty_values_are_ignored() {
    let settings = Settings::from_lookup(lookup(&[(ENV_DEFAULT_TERMINATOR, ""), (ENV_STATES_DIR, "")]));
    assert_eq!(settings.default_terminator, " ");
    assert_eq!(settings.states_dir, PathBuf::from("./states"));
}

#[test]
fn test_tilde_expansion() {
    let settings = Settings::default().with_states_dir("~/states");
    assert!(
        !settings.states_dir.to_string_lossy().starts_with('~'),
        "Tilde should be expanded: {}",
        settings.states_dir.display()
    );
    assert!(settings.states_dir.ends_with("states"));
}

#[test]
fn test_with_keylayouts_dir() {
    let settings = Settings::default().with_keylayouts_dir("/srv/layouts");
    assert_eq!(settings.keylayouts_dir, PathBuf::from("/srv/layouts"));
}
