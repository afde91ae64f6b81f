use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Mutex;

use genera_config::{discover_config_path, load_for_dir, GeneraConfig, GENERA_CONFIG_ENV_VAR};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: impl Into<OsString>) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value.into());
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn prefers_genera_toml_over_hidden_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(GENERA_CONFIG_ENV_VAR);
    let dir = tempdir().unwrap();

    assert_eq!(discover_config_path(dir.path()), None);

    std::fs::write(dir.path().join(".genera.toml"), "").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(dir.path().join(".genera.toml"))
    );

    std::fs::write(dir.path().join("genera.toml"), "").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(dir.path().join("genera.toml"))
    );
}

#[test]
fn env_var_overrides_discovery() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("genera.toml"), "").unwrap();

    let _env = EnvVarGuard::set(GENERA_CONFIG_ENV_VAR, "custom/config.toml");
    assert_eq!(
        discover_config_path(dir.path()),
        Some(dir.path().join("custom/config.toml"))
    );
}

#[test]
fn load_for_dir_defaults_without_config() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(GENERA_CONFIG_ENV_VAR);
    let dir = tempdir().unwrap();

    let (config, path) = load_for_dir(dir.path()).unwrap();
    assert_eq!(config, GeneraConfig::default());
    assert_eq!(path, None);
}

#[test]
fn load_for_dir_resolves_tables_next_to_config() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(GENERA_CONFIG_ENV_VAR);
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("genera.toml"),
        r#"
        tables = ["types/core.toml"]

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let (config, path) = load_for_dir(dir.path()).unwrap();
    assert_eq!(path, Some(dir.path().join("genera.toml")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.tables,
        vec![dir.path().join("types").join("core.toml")]
    );
    assert!(config.tables.iter().all(|p: &PathBuf| p.is_absolute()));
}
