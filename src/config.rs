use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    /// Role allowed to perform mutating calls.
    pub admin_role: String,
    pub max_body_size: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("CATALOG_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CATALOG_HOST: {e}"))?;

        let port: u16 = env_or("CATALOG_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid CATALOG_PORT: {e}"))?;

        let admin_role = env_or("CATALOG_ADMIN_ROLE", "admin");
        if admin_role.trim().is_empty() {
            return Err("CATALOG_ADMIN_ROLE must not be empty".to_string());
        }

        let max_body_size: usize = env_or("CATALOG_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid CATALOG_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("CATALOG_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            admin_role,
            max_body_size,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
