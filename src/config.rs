use crate::models::AppConfig;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, String> {
    let path = path.as_ref();
    info!("Loading configuration from: {}", path.display());

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

    let config = parse_config(&contents)?;

    info!(
        "Configuration loaded: environment {:?}, cookie '{}', {} protected prefix(es), {} seed user(s)",
        config.environment,
        config.session.cookie_name,
        config.routes.protected_prefixes.len(),
        config.users.len()
    );

    Ok(config)
}

/// Parse and validate YAML configuration
pub fn parse_config(contents: &str) -> Result<AppConfig, String> {
    let config: AppConfig = serde_yaml::from_str(contents)
        .map_err(|e| format!("Failed to parse YAML config: {}", e))?;

    config.validate()?;

    Ok(config)
}

/// Load configuration with fallback options
///
/// Tries `CONFIG_PATH`, then the usual file names in the working directory.
/// When nothing is found the built-in defaults are used.
pub fn load_config_with_fallback() -> Result<AppConfig, String> {
    if let Ok(config_path) = std::env::var("CONFIG_PATH") {
        // An explicit path that fails to load is a hard error
        return load_config(&config_path);
    }

    for path in ["config.yaml", "config.yml"] {
        if Path::new(path).exists() {
            match load_config(path) {
                Ok(config) => return Ok(config),
                Err(e) => warn!("Failed to load config from '{}': {}", path, e),
            }
        }
    }

    warn!("No configuration file found, using defaults");
    let config = AppConfig::default();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Environment, UserRole};

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
environment: production
server:
  host: 127.0.0.1
  port: 8080
session:
  cookie_name: site-session
  ttl_secs: 3600
  cleanup_interval_secs: 60
auth:
  bcrypt_cost: 4
  min_password_length: 10
  allow_registration: false
routes:
  login_path: /signin
  home_path: /admin
  protected_prefixes:
    - /admin
    - /dashboard
users:
  - name: Admin
    email: admin@example.com
    password: change-me-now
"#;

        let config = parse_config(yaml).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.secure_cookies());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.cookie_name, "site-session");
        assert_eq!(config.auth.bcrypt_cost, 4);
        assert!(!config.auth.allow_registration);
        assert_eq!(config.routes.protected_prefixes.len(), 2);
        assert_eq!(config.routes.return_param, "from");
        assert_eq!(config.users[0].role, UserRole::Admin);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.secure_cookies());
        assert_eq!(config.session.cookie_name, "test-session");
        assert_eq!(config.session.ttl_secs, 604800);
        assert_eq!(config.routes.login_path, "/login");
        assert_eq!(config.routes.protected_prefixes, vec!["/dashboard"]);
    }

    #[test]
    fn test_config_validation_rejects_zero_ttl() {
        let result = parse_config("session:\n  ttl_secs: 0\n");
        assert!(result.unwrap_err().contains("ttl_secs"));
    }

    #[test]
    fn test_config_validation_rejects_bad_bcrypt_cost() {
        let result = parse_config("auth:\n  bcrypt_cost: 2\n");
        assert!(result.unwrap_err().contains("bcrypt_cost"));
    }

    #[test]
    fn test_config_validation_rejects_protected_login_path() {
        let yaml = "routes:\n  login_path: /dashboard/login\n";
        let result = parse_config(yaml);
        assert!(result.unwrap_err().contains("cannot be under protected prefix"));
    }

    #[test]
    fn test_config_validation_rejects_relative_prefix() {
        let yaml = "routes:\n  protected_prefixes: [dashboard]\n";
        assert!(parse_config(yaml).is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = parse_config("session: [unclosed");
        assert!(result.unwrap_err().contains("Failed to parse YAML"));
    }
}
