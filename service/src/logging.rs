use crate::config::{Config, RustEnv};
use log::LevelFilter;
use simplelog::{self, ColorChoice, ConfigBuilder, SharedLogger, TermLogger, TerminalMode};

/// Modules whose records are dropped unless the level is Trace.
const FILTERED_MODULES: &[&str] = &["tower", "tracing", "hyper", "axum", "tungstenite"];

/// Resolved logger settings, derived from `Config` so they can be tested
/// without installing a global logger.
#[derive(Debug, PartialEq)]
struct LogSettings {
    level: simplelog::LevelFilter,
    filter_dependencies: bool,
    color: ColorChoice,
}

impl LogSettings {
    fn from_config(config: &Config) -> Self {
        let color = match config.runtime_env {
            RustEnv::Production | RustEnv::Staging => ColorChoice::Never,
            RustEnv::Development => ColorChoice::Auto,
        };

        Self {
            level: to_simplelog_level(config.log_level_filter),
            filter_dependencies: config.log_level_filter != LevelFilter::Trace,
            color,
        }
    }

    fn build_config(&self) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if self.filter_dependencies {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }

    fn into_logger(self) -> Box<dyn SharedLogger> {
        TermLogger::new(
            self.level,
            self.build_config(),
            TerminalMode::Mixed,
            self.color,
        )
    }
}

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger described by `config`. A second
    /// call only reports the failure on stderr.
    pub fn init_logger(config: &Config) {
        let logger = LogSettings::from_config(config).into_logger();

        if let Err(e) = simplelog::CombinedLogger::init(vec![logger]) {
            eprintln!("Logger already initialized: {e}");
        }
    }
}

fn to_simplelog_level(level: LevelFilter) -> simplelog::LevelFilter {
    match level {
        LevelFilter::Off => simplelog::LevelFilter::Off,
        LevelFilter::Error => simplelog::LevelFilter::Error,
        LevelFilter::Warn => simplelog::LevelFilter::Warn,
        LevelFilter::Info => simplelog::LevelFilter::Info,
        LevelFilter::Debug => simplelog::LevelFilter::Debug,
        LevelFilter::Trace => simplelog::LevelFilter::Trace,
    }
}
