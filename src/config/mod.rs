// Configuration module entry point
// Loads layered configuration and owns the shared application state

mod state;
mod types;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, SecurityConfig, SessionConfig};

/// Environment variable prefix, e.g. `CMS_SERVER__PORT=9000`
const ENV_PREFIX: &str = "CMS";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the server cannot run safely with
    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "session.secret must be set (CMS_SESSION__SECRET or config file)".to_string(),
            ));
        }
        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::Message(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Defaults plus a fast hashing profile and an in-memory store
    #[cfg(test)]
    pub fn for_tests() -> Self {
        with_defaults(config::Config::builder())
            .and_then(|builder| builder.set_override("session.secret", "test-secret"))
            .and_then(|builder| builder.set_override("database.path", ":memory:"))
            .and_then(|builder| builder.set_override("security.memory_kib", 8))
            .and_then(|builder| builder.set_override("security.iterations", 1))
            .and_then(ConfigBuilder::<DefaultState>::build)
            .and_then(config::Config::try_deserialize)
            .expect("test configuration must deserialize")
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 5000)?
        .set_default("server.backlog", 128)?
        .set_default("database.path", "article_board.db")?
        .set_default("session.secret", "")?
        .set_default("session.cookie_name", "session")?
        .set_default("session.secure", false)?
        .set_default("session.ttl_secs", 86_400)?
        .set_default("session.anonymous_ttl_secs", 600)?
        .set_default("security.memory_kib", 19_456)?
        .set_default("security.iterations", 2)?
        .set_default("security.parallelism", 1)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("performance.shutdown_grace", 5)?
        .set_default("http.server_name", "ArticleBoard/0.1")?
        .set_default("http.max_body_size", 1_048_576) // 1MB
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        // config::File::with_name takes the path without extension
        let stem = dir.path().join("config").to_string_lossy().into_owned();
        (dir, stem)
    }

    #[test]
    fn test_file_overrides_defaults() {
        let (_dir, path) = write_config(
            r#"
[server]
port = 8081

[session]
secret = "from-file"

[database]
path = ":memory:"
"#,
        );
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.session.secret, "from-file");
        assert_eq!(cfg.session.cookie_name, "session");
        assert_eq!(cfg.session.ttl_secs, 86_400);
        assert_eq!(cfg.session.anonymous_ttl_secs, 600);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.max_body_size, 1_048_576);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let (_dir, path) = write_config("[server]\nport = 8082\n");
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("session.secret"));
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::for_tests();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
        assert!(addr.ip().is_loopback());
    }
}
