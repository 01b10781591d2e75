// railmap settings, read once from RAILMAP_* environment variables

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Config {
    /// Route files larger than this are skipped (RAILMAP_MAX_FILE_BYTES)
    pub max_file_bytes: u64,

    /// Deepest routing block nesting the recognizer follows (RAILMAP_MAX_NESTING)
    pub max_nesting: usize,

    /// tracing filter directive (RAILMAP_LOG, falling back to RUST_LOG)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_bytes: 2 * 1024 * 1024,
            max_nesting: 64,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Config::default();

        parse_var("RAILMAP_MAX_FILE_BYTES", &mut config.max_file_bytes);
        parse_var("RAILMAP_MAX_NESTING", &mut config.max_nesting);

        if let Ok(val) = env::var("RAILMAP_LOG").or_else(|_| env::var("RUST_LOG")) {
            if !val.trim().is_empty() {
                config.log_filter = val;
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

fn parse_var<T: FromStr + std::fmt::Display>(name: &str, slot: &mut T) {
    if let Ok(val) = env::var(name) {
        parse_setting(name, &val, slot);
    }
}

// Runs before the tracing subscriber exists, hence stderr.
fn parse_setting<T: FromStr + std::fmt::Display>(name: &str, raw: &str, slot: &mut T) -> bool {
    match raw.trim().parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => {
            eprintln!("railmap: Warning: Invalid {name} value: {raw}, using default: {slot}");
            false
        }
    }
}
