// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Trade coordination core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Real-time fan-out configuration
    pub channel: ChannelConfig,

    /// Trade room chat configuration
    pub chat: ChatConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Real-time fan-out configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Broadcast buffer per trade room; a subscriber lagging further
    /// than this re-fetches from its cursor
    pub room_event_buffer: usize,

    /// Broadcast buffer per user notification feed
    pub user_event_buffer: usize,
}

/// Trade room chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum chat message body length in characters
    pub max_body_length: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let channel_config = ChannelConfig {
            room_event_buffer: env::var("ROOM_EVENT_BUFFER")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .unwrap_or(256),
            user_event_buffer: env::var("USER_EVENT_BUFFER")
                .unwrap_or_else(|_| "64".to_string())
                .parse()
                .unwrap_or(64),
        };

        let chat_config = ChatConfig {
            max_body_length: env::var("CHAT_MAX_BODY_LENGTH")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap_or(2000),
        };

        let logging_config = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            channel: channel_config,
            chat: chat_config,
            logging: logging_config,
        })
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path)
            .map_err(|e| AppError::Config(format!("Failed to open config file: {}", e)))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

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
                let file = File::create(file_path)
                    .map_err(|e| AppError::Config(format!("Failed to create log file: {}", e)))?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        // Initialize the logger
        builder.init();

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: ChannelConfig {
                room_event_buffer: 256,
                user_event_buffer: 64,
            },
            chat: ChatConfig {
                max_body_length: 2000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
