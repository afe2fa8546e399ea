//! Config file resolution and validation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Config;

/// Default config location: `~/.hireflow/config.json`.
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".hireflow").join("config.json"))
}

/// Load and validate configuration.
///
/// `explicit` overrides the default path. A missing file, a parse failure or
/// an empty required value is an error; callers stop before doing any work.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, String> {
    let config_path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    if !config_path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"azure\": {{ \"tenantId\": \"…\", \"clientId\": \"…\", \"clientSecret\": \"…\" }}, \"logoPath\": \"/path/to/logo.png\" }}",
            config_path.display()
        ));
    }

    let content =
        fs::read_to_string(&config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    validate_config(&config)?;
    log::debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

/// Every required value must be present and non-blank.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let required = [
        ("azure.tenantId", config.azure.tenant_id.as_str()),
        ("azure.clientId", config.azure.client_id.as_str()),
        ("azure.clientSecret", config.azure.client_secret.as_str()),
        ("logoPath", config.logo_path.as_str()),
    ];

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "Credentials not found. Missing required config values: {}",
            missing.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("config.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "azure": { "tenantId": "tenant", "clientId": "client", "clientSecret": "secret" },
                "logoPath": "logo.png"
            }"#,
        );
        let config = load_config(Some(&path)).expect("valid config");
        assert_eq!(config.azure.tenant_id, "tenant");
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "azure": { "tenantId": "tenant", "clientId": "client" },
                "logoPath": "logo.png"
            }"#,
        );
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.contains("azure.clientSecret"), "got: {}", err);
    }

    #[test]
    fn test_blank_logo_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "azure": { "tenantId": "t", "clientId": "c", "clientSecret": "s" },
                "logoPath": "   "
            }"#,
        );
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.contains("logoPath"));
        assert!(!err.contains("azure"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(err.contains("Config file not found"));
    }
}
