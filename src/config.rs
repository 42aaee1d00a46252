use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expire_minutes: i64,
    pub cors_origin: String,
    pub ai: AiSearchConfig,
}

/// Settings for the natural-language search adapter.
#[derive(Debug, Clone)]
pub struct AiSearchConfig {
    /// `None` disables the smart search; every query falls back to substring search.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let jwt_expire_minutes = env::var("JWT_EXPIRE_MINUTES")
            .ok()
            .and_then(|m| m.parse::<i64>().ok())
            .unwrap_or(30);
        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:4200".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_expire_minutes,
            cors_origin,
            ai: AiSearchConfig::from_env(),
        })
    }
}

impl AiSearchConfig {
    pub const DEFAULT_TIMEOUT_SECS: f64 = 3.0;

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        let timeout = parse_timeout(env::var("AI_SEARCH_TIMEOUT_SECONDS").ok().as_deref());
        Self {
            api_key,
            model,
            timeout,
        }
    }
}

fn parse_timeout(raw: Option<&str>) -> Duration {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or_else(|| Duration::from_secs_f64(AiSearchConfig::DEFAULT_TIMEOUT_SECS))
}
