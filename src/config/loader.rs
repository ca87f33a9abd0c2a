// Configuration loader with environment variable substitution

use super::types::*;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<VaultConfig> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        // Substitute environment variables
        let content = Self::substitute_env_vars(&content);

        // Parse YAML
        let config: VaultConfig =
            serde_yaml::from_str(&content).context("Failed to parse YAML configuration")?;

        // Validate configuration
        Self::validate(&config)?;

        Ok(config)
    }

    /// Substitute ${VAR} and ${VAR:-default} patterns with environment variables
    ///
    /// Examples:
    /// - ${HOME} -> /home/user
    /// - ${DB1_URL:-postgres://localhost/orders1} -> the default if DB1_URL not set
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]+))?\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str());

            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if let Some(default) = default_value {
                        default.to_string()
                    } else {
                        // Keep original if no default and var not found
                        format!("${{{}}}", var_name)
                    }
                }
            }
        })
        .to_string()
    }

    /// Validate configuration
    ///
    /// An inconsistent rotation or cleanup policy must prevent startup
    /// rather than surface later inside the critical section.
    fn validate(config: &VaultConfig) -> Result<()> {
        if config.storage.backends.is_empty() {
            bail!("storage.backends must configure at least one backend");
        }

        let mut names = std::collections::HashSet::new();
        for entry in &config.storage.backends {
            if entry.name.is_empty() {
                bail!("backend name cannot be empty");
            }
            if !names.insert(entry.name.as_str()) {
                bail!("duplicate backend name: '{}'", entry.name);
            }

            match &entry.backend {
                BackendConfig::Postgres { postgres } => {
                    if postgres.url.is_empty() {
                        bail!("backend '{}': postgres.url cannot be empty", entry.name);
                    }
                }
                BackendConfig::Filesystem { filesystem } => {
                    if filesystem.base_path.is_empty() {
                        bail!(
                            "backend '{}': filesystem.base_path cannot be empty",
                            entry.name
                        );
                    }
                }
            }
        }

        if config.rotation.max_size_mb == 0 {
            bail!("rotation.max_size_mb must be > 0");
        }

        if !names.contains(config.rotation.active_backend.as_str()) {
            bail!(
                "rotation.active_backend '{}' does not name a configured backend",
                config.rotation.active_backend
            );
        }

        if config.cleanup.interval_hours == 0 {
            bail!("cleanup.interval_hours must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_VAULT_VAR", "test_value");

        let input = "url: ${TEST_VAULT_VAR}";
        let output = ConfigLoader::substitute_env_vars(input);
        assert_eq!(output, "url: test_value");

        std::env::remove_var("TEST_VAULT_VAR");
    }

    #[test]
    fn test_env_var_with_default() {
        std::env::remove_var("TEST_VAULT_VAR2");

        let input = "active_backend: ${TEST_VAULT_VAR2:-primary}";
        let output = ConfigLoader::substitute_env_vars(input);
        assert_eq!(output, "active_backend: primary");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
storage:
  backends:
    - name: primary
      postgres:
        url: postgres://localhost:5432/orders1
    - name: secondary
      filesystem:
        base_path: /data/orders
rotation:
  strategy: size_based
  max_size_mb: 500
  active_backend: primary
cleanup:
  enabled: true
  interval_hours: 120
  retention_days: 5
telegram:
  bot_token: token
  chat_id: chat
"#;
        let config: VaultConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(ConfigLoader::validate(&config).is_ok());

        assert_eq!(config.storage.backends.len(), 2);
        assert!(config.storage.backends[0].backend.as_postgres().is_some());
        assert!(config.storage.backends[1].backend.as_filesystem().is_some());
        assert_eq!(config.rotation.strategy, RotationStrategy::SizeBased);
        assert_eq!(config.cleanup.retention_days, 5);
        assert!(config.telegram.is_some());
    }

    #[test]
    fn test_validation_zero_threshold() {
        let mut config = VaultConfig::default();
        config.rotation.max_size_mb = 0;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_size_mb"));
    }

    #[test]
    fn test_validation_unknown_active_backend() {
        let mut config = VaultConfig::default();
        config.rotation.active_backend = "nonexistent".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("active_backend"));
    }

    #[test]
    fn test_validation_duplicate_backend_names() {
        let mut config = VaultConfig::default();
        config.storage.backends[1].name = "primary".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_validation_zero_interval() {
        let mut config = VaultConfig::default();
        config.cleanup.interval_hours = 0;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("interval_hours"));
    }

    #[test]
    fn test_unknown_strategy_fails_to_parse() {
        let yaml = r#"
storage:
  backends:
    - name: primary
      filesystem:
        base_path: /data/orders
rotation:
  strategy: weekly
  active_backend: primary
"#;
        let result: Result<VaultConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
