use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::survey::metrics::MetricsPolicy;

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
    pub audit: AuditConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            audit: AuditConfig::load()?,
        })
    }
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which assistant backend the service wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantMode {
    Disabled,
    Offline,
}

impl AssistantMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "disabled" | "off" => Some(Self::Disabled),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Survey policy, admin access and assistant wiring.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub policy: MetricsPolicy,
    pub admin: Option<AdminCredentials>,
    pub assistant_mode: AssistantMode,
}

impl AuditConfig {
    fn load() -> Result<Self, ConfigError> {
        let defaults = MetricsPolicy::default();
        let policy = MetricsPolicy {
            cost_per_kwh: number_var("AUDIT_COST_PER_KWH", defaults.cost_per_kwh)?,
            co2_kg_per_kwh: number_var("AUDIT_CO2_FACTOR", defaults.co2_kg_per_kwh)?,
            bill_period_days: number_var("AUDIT_BILL_PERIOD_DAYS", defaults.bill_period_days)?,
            consistency_tolerance: number_var(
                "AUDIT_CONSISTENCY_TOLERANCE",
                defaults.consistency_tolerance,
            )?,
            high_power_watts: number_var("AUDIT_HIGH_POWER_WATTS", defaults.high_power_watts)?,
        };

        if policy.bill_period_days <= 0.0 {
            return Err(ConfigError::InvalidNumber {
                variable: "AUDIT_BILL_PERIOD_DAYS",
                value: policy.bill_period_days.to_string(),
            });
        }

        let admin = match (
            non_empty_var("AUDIT_ADMIN_EMAIL"),
            non_empty_var("AUDIT_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminCredentials { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteAdminCredentials),
        };

        let raw_mode = env::var("AUDIT_ASSISTANT_MODE").unwrap_or_default();
        let assistant_mode = AssistantMode::parse(&raw_mode)
            .ok_or(ConfigError::InvalidAssistantMode { value: raw_mode })?;

        Ok(Self {
            policy,
            admin,
            assistant_mode,
        })
    }
}

fn number_var(variable: &'static str, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = non_empty_var(variable) else {
        return Ok(default);
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            variable,
            value: raw,
        }),
    }
}

fn non_empty_var(variable: &str) -> Option<String> {
    env::var(variable)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str, value: String },
    InvalidAssistantMode { value: String },
    IncompleteAdminCredentials,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be a non-negative number (got '{value}')")
            }
            ConfigError::InvalidAssistantMode { value } => {
                write!(
                    f,
                    "AUDIT_ASSISTANT_MODE must be 'disabled' or 'offline' (got '{value}')"
                )
            }
            ConfigError::IncompleteAdminCredentials => write!(
                f,
                "AUDIT_ADMIN_EMAIL and AUDIT_ADMIN_PASSWORD must be set together"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidAssistantMode { .. }
            | ConfigError::IncompleteAdminCredentials => None,
        }
    }
}
