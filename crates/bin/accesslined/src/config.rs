//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `accessline.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::HashSet;

use serde::Deserialize;

use accessline_app::services::catalog_service::ServiceDeclaration;
use accessline_app::services::instance_registry::InstanceRegistry;
use accessline_app::services::tag_allocator::DEFAULT_MAX_ATTEMPTS;
use accessline_domain::service::{ACCESS_LINE_CONTROLLER, AccessMode, SUBSCRIBER_CAPABILITY};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Tag allocation settings.
    pub allocation: AllocationConfig,
    /// Provisioning settings.
    pub provisioning: ProvisioningConfig,
    /// Virtual access-manager inventory.
    pub access: AccessConfig,
    /// Declared service graph.
    pub catalog: CatalogConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Draws per tag before giving up.
    pub max_attempts: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Capability of the provider instance created for each new subscriber.
    /// Must be one [`InstanceRegistry::with_defaults`] can build.
    pub target_capability: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// ONU devices known to the virtual access manager. Empty means the
    /// built-in demo devices.
    pub devices: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub services: Vec<ServiceConfig>,
}

/// One `[[catalog.services]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub capability: String,
    #[serde(default)]
    pub access: AccessMode,
    /// Names of the services this one depends on, in order.
    #[serde(default)]
    pub providers: Vec<String>,
}

impl From<&ServiceConfig> for ServiceDeclaration {
    fn from(value: &ServiceConfig) -> Self {
        Self {
            name: value.name.clone(),
            capability: value.capability.clone(),
            access: value.access,
            providers: value.providers.clone(),
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn declarations(&self) -> Vec<ServiceDeclaration> {
        self.services.iter().map(ServiceDeclaration::from).collect()
    }
}

impl Config {
    /// Load configuration from `accessline.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("accessline.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ACCESSLINE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("ACCESSLINE_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("ACCESSLINE_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("ACCESSLINE_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("ACCESSLINE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.allocation.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "allocation.max_attempts must be non-zero".to_string(),
            ));
        }
        let capability = &self.provisioning.target_capability;
        if InstanceRegistry::with_defaults().get(capability).is_none() {
            return Err(ConfigError::Validation(format!(
                "provisioning.target_capability {capability} has no instance factory"
            )));
        }
        let declared: HashSet<&str> = self
            .catalog
            .services
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        for service in &self.catalog.services {
            if let Some(missing) = service
                .providers
                .iter()
                .find(|p| !declared.contains(p.as_str()))
            {
                return Err(ConfigError::Validation(format!(
                    "service {} depends on undeclared service {missing}",
                    service.name
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:accessline.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "accesslined=info,accessline=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            target_capability: ACCESS_LINE_CONTROLLER.to_string(),
        }
    }
}

/// A residential service whose access network is managed by one OLT service.
impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            services: vec![
                ServiceConfig {
                    name: "olt".to_string(),
                    capability: ACCESS_LINE_CONTROLLER.to_string(),
                    access: AccessMode::Unmanaged,
                    providers: vec![],
                },
                ServiceConfig {
                    name: "residential".to_string(),
                    capability: SUBSCRIBER_CAPABILITY.to_string(),
                    access: AccessMode::DeviceManaged,
                    providers: vec!["olt".to_string()],
                },
            ],
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
