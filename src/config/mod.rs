// Configuration module entry point
// Layered configuration: built-in defaults, optional file, environment

mod site;
mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use site::{normalize_lexically, SiteConfig};
pub use state::AppState;
pub use types::{AssetsConfig, Config, LogFormat, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file looked up in the working directory (any format the `config`
/// crate recognizes by extension)
pub const DEFAULT_CONFIG_FILE: &str = "coi-serve";
/// Environment variable pointing at an alternative config file
pub const CONFIG_PATH_ENV: &str = "COI_SERVE_CONFIG";
/// Prefix for `COI_SERVE_SECTION__KEY` overrides
pub const ENV_PREFIX: &str = "COI_SERVE";
/// Listen port override, takes precedence over every other source
pub const PORT_ENV: &str = "PORT";

impl Config {
    /// Load configuration from the default file location and the environment
    pub fn load() -> Result<Self, ServerError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let port = std::env::var(PORT_ENV).ok();
        Self::load_from(&path, port.as_deref())
    }

    /// Load configuration from specified file path, applying `port` last
    pub fn load_from(config_path: &str, port: Option<&str>) -> Result<Self, ServerError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("assets.root", "public")?
            .set_default("assets.index_file", "index.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.format", "pretty")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 60)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Some(raw) = port {
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|e| ServerError::Config(format!("invalid {PORT_ENV} '{raw}': {e}")))?;
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid listen address: {e}")))
    }
}
