/// Mock backend configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | LOG_LEVEL | info | Log level (trace, debug, info, warn, error) |
/// | LOG_DIR | (none) | Directory for daily rolling log files |
/// | SEED_DEMO_DATA | true | Load the demo transactions on startup |
///
/// ```ignore
/// HTTP_PORT=8080 SEED_DEMO_DATA=false cargo run -p stockroom-mock
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub seed_demo_data: bool,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            seed_demo_data: std::env::var("SEED_DEMO_DATA")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".into(),
            log_dir: None,
            seed_demo_data: true,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
