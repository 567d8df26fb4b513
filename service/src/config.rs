use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Largest inbound WebSocket message accepted from a client (1 MiB).
pub const DEFAULT_WS_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Frames that may wait in one connection's outbound queue before further
/// frames for that connection are dropped.
pub const DEFAULT_WS_SEND_QUEUE_CAPACITY: usize = 256;

/// Number of records returned by list endpoints when no `limit` is given.
pub const DEFAULT_LIST_LIMIT: u64 = 50;

/// Upper bound for the `limit` query parameter of list endpoints.
pub const MAX_LIST_LIMIT: u64 = 100;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Maximum size in bytes of a single inbound WebSocket message/frame
    #[arg(long, env, default_value_t = DEFAULT_WS_MAX_PAYLOAD_BYTES)]
    pub ws_max_payload_bytes: usize,

    /// Outbound frames buffered per WebSocket connection (at least 1)
    #[arg(
        long,
        env,
        default_value_t = DEFAULT_WS_SEND_QUEUE_CAPACITY,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub ws_send_queue_capacity: usize,

    /// Number of records returned by list endpoints when the client omits `limit`
    #[arg(long, env, default_value_t = DEFAULT_LIST_LIMIT)]
    pub default_list_limit: u64,

    /// Largest `limit` a client may request from list endpoints
    #[arg(long, env, default_value_t = MAX_LIST_LIMIT)]
    pub max_list_limit: u64,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Builds a Config purely from defaults and environment, ignoring the
    /// process arguments. Used by tests and embedded servers.
    pub fn from_defaults() -> Self {
        Config::parse_from(["match_feed_rs"])
    }

    /// The `interface:port` pair the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!(
            "{}:{}",
            self.interface.as_deref().unwrap_or("127.0.0.1"),
            self.port
        )
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_env_parses_case_insensitively() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    fn test_defaults_cap_websocket_payload_at_one_mebibyte() {
        let config = Config::parse_from(["match_feed_rs"]);
        assert_eq!(config.ws_max_payload_bytes, 1_048_576);
    }

    #[test]
    fn test_send_queue_capacity_defaults_and_rejects_zero() {
        let config = Config::parse_from(["match_feed_rs"]);
        assert_eq!(config.ws_send_queue_capacity, 256);

        let parsed = Config::try_parse_from(["match_feed_rs", "--ws-send-queue-capacity", "0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_list_limits_default_to_fifty_and_one_hundred() {
        let config = Config::parse_from(["match_feed_rs"]);
        assert_eq!(config.default_list_limit, 50);
        assert_eq!(config.max_list_limit, 100);
    }

    #[test]
    fn test_listen_addr_joins_interface_and_port() {
        let config = Config::parse_from([
            "match_feed_rs",
            "--interface",
            "0.0.0.0",
            "--port",
            "8080",
        ]);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }
}
