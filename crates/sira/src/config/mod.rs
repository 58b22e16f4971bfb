use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_JUSTIMMO_BASE_URL: &str = "https://api.justimmo.at/rest/v1";
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub justimmo: JustimmoConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "8080".to_string())
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(&env::var("APP_LOG_FORMAT").unwrap_or_default());

        let justimmo = JustimmoConfig {
            base_url: var_or("JUSTIMMO_BASE_URL", DEFAULT_JUSTIMMO_BASE_URL),
            username: var_or("JUSTIMMO_USER", ""),
            password: var_or("JUSTIMMO_PASSWORD", ""),
        };

        let mail = MailConfig {
            tenant_id: var_or("AZURE_TENANT_ID", ""),
            client_id: var_or("AZURE_CLIENT_ID", ""),
            client_secret: var_or("AZURE_CLIENT_SECRET", ""),
            authority_url: var_or("AZURE_AUTHORITY_URL", DEFAULT_AUTHORITY_URL),
            graph_base_url: var_or("GRAPH_BASE_URL", DEFAULT_GRAPH_BASE_URL),
            sender: var_or("MAIL_SENDER", ""),
            recipient: var_or("MAIL_RECIPIENT", ""),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
                ansi: environment == AppEnvironment::Development,
            },
            justimmo,
            mail,
        })
    }

    /// Names of credential variables that are unset. The service still starts
    /// without them; the affected endpoint fails upstream instead.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let checks = [
            ("JUSTIMMO_USER", &self.justimmo.username),
            ("JUSTIMMO_PASSWORD", &self.justimmo.password),
            ("AZURE_TENANT_ID", &self.mail.tenant_id),
            ("AZURE_CLIENT_ID", &self.mail.client_id),
            ("AZURE_CLIENT_SECRET", &self.mail.client_secret),
            ("MAIL_SENDER", &self.mail.sender),
            ("MAIL_RECIPIENT", &self.mail.recipient),
        ];

        checks
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub ansi: bool,
}

/// Credentials and endpoint for the JustImmo REST API.
#[derive(Clone)]
pub struct JustimmoConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for JustimmoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JustimmoConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Entra ID application credentials plus the Graph mailboxes used for contact mail.
#[derive(Clone)]
pub struct MailConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub authority_url: String,
    pub graph_base_url: String,
    pub sender: String,
    pub recipient: String,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_url", &self.authority_url)
            .field("graph_base_url", &self.graph_base_url)
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT (or PORT) must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
