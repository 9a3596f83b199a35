pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/applications";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

impl ServerConfig {
    /// `host:port`; the host may be a name, it is resolved at bind time.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where log events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// No subscriber is installed; events are dropped.
    Off,
}

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
    pub output: LogOutput,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            default_filter: "warn".to_string(),
            output: LogOutput::Stderr,
        }
    }
}

impl TracingConfig {
    pub fn for_server() -> Self {
        Self {
            default_filter: "info,jobtrack=debug,tower_http=debug".to_string(),
            ..Self::default()
        }
    }

    /// The dashboard owns the terminal, so stderr output would land on top
    /// of the drawn frame. Errors are shown on its footer instead.
    pub fn for_terminal_ui() -> Self {
        Self {
            output: LogOutput::Off,
            ..Self::default()
        }
    }
}
