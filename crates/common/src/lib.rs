use clap::Parser;
use database::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:finance.db")]
    pub database_url: String,

    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Currency assigned to transactions created without one.
    #[arg(long, env = "DEFAULT_CURRENCY", default_value = "ARS")]
    pub default_currency: String,

    /// Origins accepted by CORS in production, comma separated.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["app"]);
        assert_eq!(config.default_currency, "ARS");
        assert!(!config.is_production());
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_allowed_origins_are_split() {
        let config = Config::parse_from([
            "app",
            "--environment",
            "production",
            "--allowed-origins",
            "https://a.example,https://b.example",
        ]);
        assert!(config.is_production());
        assert_eq!(config.allowed_origins, vec!["https://a.example", "https://b.example"]);
    }
}
