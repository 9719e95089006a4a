use crate::domain::errors::{AppError, AppResult};
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTTP listener
    pub server: ServerConfig,

    /// Opening balances of the simulated venues
    pub venues: VenueConfig,

    /// Trial and expiry policy
    pub subscription: SubscriptionConfig,

    /// Randomness for quotes and profit estimates
    pub prediction: PredictionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:3000"
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenueConfig {
    pub crypto_balance: Decimal,
    pub forex_balance: Decimal,
    pub cfd_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionConfig {
    /// Length of the signup trial in days
    pub trial_days: i64,

    /// A trial with this many days or fewer left raises an expiring notice
    pub expiry_notice_days: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PredictionConfig {
    /// Fixed seed for reproducible runs; entropy when absent
    pub random_seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

/// Upper bound for any policy length in days (about a century).
pub const MAX_POLICY_DAYS: i64 = 36_500;

fn env_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let server = ServerConfig {
            bind_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server.bind_addr),
        };

        let venues = VenueConfig {
            crypto_balance: env_or("CRYPTO_BALANCE", defaults.venues.crypto_balance)?,
            forex_balance: env_or("FOREX_BALANCE", defaults.venues.forex_balance)?,
            cfd_balance: env_or("CFD_BALANCE", defaults.venues.cfd_balance)?,
        };

        let subscription = SubscriptionConfig {
            trial_days: env_or("TRIAL_DAYS", defaults.subscription.trial_days)?,
            expiry_notice_days: env_or(
                "EXPIRY_NOTICE_DAYS",
                defaults.subscription.expiry_notice_days,
            )?,
        };

        let prediction = PredictionConfig {
            random_seed: match env::var("RANDOM_SEED") {
                Ok(raw) => Some(raw.trim().parse().map_err(|_| {
                    AppError::Config(format!("Invalid value for RANDOM_SEED: {}", raw))
                })?),
                Err(_) => None,
            },
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or(defaults.logging.level),
            to_file: env_or("LOG_TO_FILE", false)?,
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        let config = Config {
            server,
            venues,
            subscription,
            prediction,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file. Missing sections take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::Config(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, contents).map_err(|e| {
            AppError::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.subscription.trial_days <= 0 {
            return Err(AppError::Config("trial_days must be positive".to_string()));
        }
        if self.subscription.expiry_notice_days < 0 {
            return Err(AppError::Config(
                "expiry_notice_days must not be negative".to_string(),
            ));
        }
        if self.subscription.trial_days > MAX_POLICY_DAYS
            || self.subscription.expiry_notice_days > MAX_POLICY_DAYS
        {
            return Err(AppError::Config(format!(
                "subscription periods must not exceed {} days",
                MAX_POLICY_DAYS
            )));
        }
        let balances = [
            self.venues.crypto_balance,
            self.venues.forex_balance,
            self.venues.cfd_balance,
        ];
        if balances.iter().any(|b| b.is_sign_negative()) {
            return Err(AppError::Config("venue balances must not be negative".to_string()));
        }
        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder
            .try_init()
            .map_err(|e| AppError::Config(format!("Failed to initialize logger: {}", e)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            venues: VenueConfig::default(),
            subscription: SubscriptionConfig::default(),
            prediction: PredictionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            crypto_balance: Decimal::new(10_000, 0),
            forex_balance: Decimal::new(5_000, 0),
            cfd_balance: Decimal::new(7_500, 0),
        }
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            trial_days: 7,
            expiry_notice_days: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            to_file: false,
            file_path: None,
        }
    }
}
