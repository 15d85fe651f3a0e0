//! Configuration loading and resolution
//!
//! Every setting is resolved once at startup following this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`ServiceConfig`] is passed explicitly to the components that
//! need it. Nothing in this module writes to the process environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ESSAY_GRADER_CONFIG";

/// Environment variable names recognized by the resolver
pub mod env_vars {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const SECRET_KEY: &str = "SECRET_KEY";
    pub const ALGORITHM: &str = "ALGORITHM";
    pub const HOST: &str = "ESSAY_GRADER_HOST";
    pub const PORT: &str = "ESSAY_GRADER_PORT";
    pub const MODEL: &str = "ESSAY_GRADER_MODEL";
    pub const LLM_BASE_URL: &str = "ESSAY_GRADER_LLM_BASE_URL";
    pub const LLM_TIMEOUT_SECS: &str = "ESSAY_GRADER_LLM_TIMEOUT_SECS";
    pub const LOG_LEVEL: &str = "ESSAY_GRADER_LOG_LEVEL";
}

/// JWT algorithms accepted for the shared-secret token service
pub const SUPPORTED_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Upper bound for `auth.token_expire_minutes` (one year)
pub const MAX_TOKEN_EXPIRE_MINUTES: i64 = 365 * 24 * 60;

// ========================================
// Compiled defaults
// ========================================

/// Fallback values used when no other source provides a setting
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub llm_base_url: String,
    pub llm_timeout_secs: u64,
    pub algorithm: String,
    pub token_expire_minutes: i64,
    pub generate_corrections: bool,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            model: "gpt-4o-mini".to_string(),
            llm_base_url: "https://api.openai.com/v1".to_string(),
            llm_timeout_secs: 30,
            algorithm: "HS256".to_string(),
            token_expire_minutes: 30,
            generate_corrections: true,
            log_level: "info".to_string(),
        }
    }
}

// ========================================
// TOML file schema
// ========================================

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerSection,
    pub llm: LlmSection,
    pub auth: AuthSection,
    pub grading: GradingSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthSection {
    pub secret_key: Option<String>,
    pub algorithm: Option<String>,
    pub token_expire_minutes: Option<i64>,
    /// username -> SHA-256 hex digest of the password
    pub users: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GradingSection {
    pub generate_corrections: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

// ========================================
// Resolved configuration
// ========================================

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub auth: AuthSettings,
    pub grading: GradingSettings,
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret_key: String,
    pub algorithm: String,
    pub token_expire_minutes: i64,
    pub users: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct GradingSettings {
    pub generate_corrections: bool,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub log_level: Option<String>,
}

// ========================================
// Resolver
// ========================================

fn read_process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolves [`ServiceConfig`] from CLI, environment, TOML and defaults
///
/// The environment is read through the `env` lookup function so tests can
/// supply their own variables without touching the process environment.
pub struct ConfigResolver<F = fn(&str) -> Option<String>> {
    env: F,
    defaults: CompiledDefaults,
}

impl ConfigResolver {
    /// Resolver reading the real process environment
    pub fn from_process_env() -> Self {
        Self::with_env(read_process_env as fn(&str) -> Option<String>)
    }
}

impl<F> ConfigResolver<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn with_env(env: F) -> Self {
        Self {
            env,
            defaults: CompiledDefaults::default(),
        }
    }

    /// Look up an environment variable, ignoring blank values
    fn env_value(&self, name: &str) -> Option<String> {
        (self.env)(name).filter(|v| is_valid_value(v))
    }

    fn env_parsed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>> {
        match self.env_value(name) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", name, raw))),
            None => Ok(None),
        }
    }

    /// Locate the config file
    ///
    /// Priority: CLI path, `ESSAY_GRADER_CONFIG`, user config dir, `/etc`.
    /// Returns `None` when no candidate exists.
    pub fn locate_config_file(&self, cli_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = cli_path {
            return Some(path.to_path_buf());
        }

        if let Some(path) = self.env_value(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        let user_config = dirs::config_dir().map(|d| d.join("essay-grader").join("config.toml"));
        if let Some(path) = user_config {
            if path.exists() {
                return Some(path);
            }
        }

        let system_config = PathBuf::from("/etc/essay-grader/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load the TOML config
    ///
    /// A missing default-location file is not an error. A file named
    /// explicitly (CLI or environment) must exist and parse.
    pub fn load_toml(&self, cli_path: Option<&Path>) -> Result<TomlConfig> {
        let explicit = cli_path.is_some() || self.env_value(CONFIG_ENV_VAR).is_some();

        match self.locate_config_file(cli_path) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                TomlConfig::from_file(&path)
            }
            Some(path) if explicit => Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            _ => {
                warn!("No config file found, using environment and compiled defaults");
                Ok(TomlConfig::default())
            }
        }
    }

    /// Load the TOML config and resolve every setting
    pub fn resolve(&self, cli: &CliOverrides) -> Result<ServiceConfig> {
        let toml_config = self.load_toml(cli.config_path.as_deref())?;
        self.resolve_with_toml(cli, &toml_config)
    }

    /// Resolve every setting against an already-loaded TOML config
    pub fn resolve_with_toml(&self, cli: &CliOverrides, toml: &TomlConfig) -> Result<ServiceConfig> {
        let d = &self.defaults;

        let host = first_of([
            cli.host.clone(),
            self.env_value(env_vars::HOST),
            toml.server.host.clone(),
        ])
        .unwrap_or_else(|| d.host.clone());

        let port = match cli.port {
            Some(port) => port,
            None => self
                .env_parsed::<u16>(env_vars::PORT)?
                .or(toml.server.port)
                .unwrap_or(d.port),
        };

        let api_key = first_of([
            self.env_value(env_vars::OPENAI_API_KEY),
            toml.llm.api_key.clone().filter(|k| is_valid_value(k)),
        ])
        .ok_or_else(|| {
            Error::Config(format!(
                "LLM API key not configured. Set {} or llm.api_key in config.toml",
                env_vars::OPENAI_API_KEY
            ))
        })?;

        let model = first_of([
            cli.model.clone(),
            self.env_value(env_vars::MODEL),
            toml.llm.model.clone(),
        ])
        .unwrap_or_else(|| d.model.clone());

        let base_url = first_of([self.env_value(env_vars::LLM_BASE_URL), toml.llm.base_url.clone()])
            .unwrap_or_else(|| d.llm_base_url.clone());

        let timeout_secs = self
            .env_parsed::<u64>(env_vars::LLM_TIMEOUT_SECS)?
            .or(toml.llm.timeout_secs)
            .unwrap_or(d.llm_timeout_secs);
        if timeout_secs == 0 {
            return Err(Error::Config("LLM timeout must be greater than zero".to_string()));
        }

        let secret_key = first_of([
            self.env_value(env_vars::SECRET_KEY),
            toml.auth.secret_key.clone().filter(|k| is_valid_value(k)),
        ])
        .ok_or_else(|| {
            Error::Config(format!(
                "Token secret not configured. Set {} or auth.secret_key in config.toml",
                env_vars::SECRET_KEY
            ))
        })?;

        let algorithm = first_of([self.env_value(env_vars::ALGORITHM), toml.auth.algorithm.clone()])
            .map(|a| a.trim().to_ascii_uppercase())
            .unwrap_or_else(|| d.algorithm.clone());
        if !SUPPORTED_ALGORITHMS.contains(&algorithm.as_str()) {
            return Err(Error::Config(format!(
                "Unsupported token algorithm {:?} (expected one of {})",
                algorithm,
                SUPPORTED_ALGORITHMS.join(", ")
            )));
        }

        let token_expire_minutes = toml
            .auth
            .token_expire_minutes
            .unwrap_or(d.token_expire_minutes);
        if token_expire_minutes <= 0 || token_expire_minutes > MAX_TOKEN_EXPIRE_MINUTES {
            return Err(Error::Config(format!(
                "auth.token_expire_minutes must be between 1 and {}, got {}",
                MAX_TOKEN_EXPIRE_MINUTES, token_expire_minutes
            )));
        }

        let log_level = first_of([
            cli.log_level.clone(),
            self.env_value(env_vars::LOG_LEVEL),
            toml.logging.level.clone(),
        ])
        .unwrap_or_else(|| d.log_level.clone());

        Ok(ServiceConfig {
            server: ServerSettings { host, port },
            llm: LlmSettings {
                api_key,
                model,
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(timeout_secs),
                temperature: toml.llm.temperature,
            },
            auth: AuthSettings {
                secret_key,
                algorithm,
                token_expire_minutes,
                users: toml.auth.users.clone(),
            },
            grading: GradingSettings {
                generate_corrections: toml
                    .grading
                    .generate_corrections
                    .unwrap_or(d.generate_corrections),
            },
            log_level,
        })
    }
}

/// A setting value is usable when it is non-empty and non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

fn first_of<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates.into_iter().flatten().find(|v| is_valid_value(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn required_env() -> Vec<(&'static str, &'static str)> {
        vec![(env_vars::OPENAI_API_KEY, "sk-test"), (env_vars::SECRET_KEY, "s3cret")]
    }

    #[test]
    fn test_defaults_applied_when_only_secrets_present() {
        let resolver = ConfigResolver::with_env(env_from(&required_env()));
        let config = resolver
            .resolve_with_toml(&CliOverrides::default(), &TomlConfig::default())
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
        assert_eq!(config.auth.algorithm, "HS256");
        assert_eq!(config.auth.token_expire_minutes, 30);
        assert!(config.grading.generate_corrections);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_beats_env_beats_toml() {
        let mut env = required_env();
        env.push((env_vars::PORT, "9001"));
        env.push((env_vars::MODEL, "env-model"));
        let resolver = ConfigResolver::with_env(env_from(&env));

        let mut toml = TomlConfig::default();
        toml.server.port = Some(7000);
        toml.server.host = Some("0.0.0.0".to_string());
        toml.llm.model = Some("toml-model".to_string());

        let cli = CliOverrides {
            model: Some("cli-model".to_string()),
            ..Default::default()
        };

        let config = resolver.resolve_with_toml(&cli, &toml).unwrap();
        assert_eq!(config.llm.model, "cli-model");
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let resolver = ConfigResolver::with_env(env_from(&[(env_vars::SECRET_KEY, "s")]));
        let err = resolver
            .resolve_with_toml(&CliOverrides::default(), &TomlConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("OPENAI_API_KEY")));
    }

    #[test]
    fn test_blank_env_value_falls_through_to_toml() {
        let resolver = ConfigResolver::with_env(env_from(&[
            (env_vars::OPENAI_API_KEY, "   "),
            (env_vars::SECRET_KEY, "s"),
        ]));
        let mut toml = TomlConfig::default();
        toml.llm.api_key = Some("toml-key".to_string());

        let config = resolver
            .resolve_with_toml(&CliOverrides::default(), &toml)
            .unwrap();
        assert_eq!(config.llm.api_key, "toml-key");
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let mut env = required_env();
        env.push((env_vars::ALGORITHM, "RS256"));
        let resolver = ConfigResolver::with_env(env_from(&env));
        assert!(resolver
            .resolve_with_toml(&CliOverrides::default(), &TomlConfig::default())
            .is_err());
    }

    #[test]
    fn test_algorithm_is_normalized_to_uppercase() {
        let mut env = required_env();
        env.push((env_vars::ALGORITHM, "hs512"));
        let resolver = ConfigResolver::with_env(env_from(&env));
        let config = resolver
            .resolve_with_toml(&CliOverrides::default(), &TomlConfig::default())
            .unwrap();
        assert_eq!(config.auth.algorithm, "HS512");
    }

    #[test]
    fn test_invalid_port_in_env_is_error() {
        let mut env = required_env();
        env.push((env_vars::PORT, "not-a-port"));
        let resolver = ConfigResolver::with_env(env_from(&env));
        assert!(resolver
            .resolve_with_toml(&CliOverrides::default(), &TomlConfig::default())
            .is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut env = required_env();
        env.push((env_vars::LLM_TIMEOUT_SECS, "0"));
        let resolver = ConfigResolver::with_env(env_from(&env));
        assert!(resolver
            .resolve_with_toml(&CliOverrides::default(), &TomlConfig::default())
            .is_err());
    }

    #[test]
    fn test_token_lifetime_out_of_range_rejected() {
        let resolver = ConfigResolver::with_env(env_from(&required_env()));

        for minutes in [0, -1, MAX_TOKEN_EXPIRE_MINUTES + 1, 1_000_000_000_000] {
            let toml = TomlConfig::from_toml_str(&format!(
                "[auth]\ntoken_expire_minutes = {}",
                minutes
            ))
            .unwrap();
            let err = resolver
                .resolve_with_toml(&CliOverrides::default(), &toml)
                .unwrap_err();
            assert!(
                matches!(err, Error::Config(ref msg) if msg.contains("token_expire_minutes")),
                "{} minutes",
                minutes
            );
        }

        let mut toml = TomlConfig::default();
        toml.auth.token_expire_minutes = Some(MAX_TOKEN_EXPIRE_MINUTES);
        let config = resolver
            .resolve_with_toml(&CliOverrides::default(), &toml)
            .unwrap();
        assert_eq!(config.auth.token_expire_minutes, MAX_TOKEN_EXPIRE_MINUTES);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut env = required_env();
        env.push((env_vars::LLM_BASE_URL, "http://localhost:11434/v1/"));
        let resolver = ConfigResolver::with_env(env_from(&env));
        let config = resolver
            .resolve_with_toml(&CliOverrides::default(), &TomlConfig::default())
            .unwrap();
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(server.bind_addr(), "0.0.0.0:8080");
    }
}
