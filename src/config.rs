use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Upstream headline API (newsapi.org compatible). The key is optional at
/// startup; the proxy fails the request when it is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiConfig {
    pub key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub news_api: NewsApiConfig,
    pub minio_endpoint: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "newsdesk".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "newsdesk-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let news_api = NewsApiConfig {
            key: std::env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("NEWS_API_BASE_URL")
                .unwrap_or_else(|_| "https://newsapi.org/v2".into()),
            timeout_secs: std::env::var("NEWS_API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        Ok(Self {
            database_url,
            jwt,
            news_api,
            minio_endpoint: std::env::var("MINIO_ENDPOINT")?,
            minio_bucket: std::env::var("MINIO_BUCKET")?,
            minio_access_key: std::env::var("MINIO_ACCESS_KEY")?,
            minio_secret_key: std::env::var("MINIO_SECRET_KEY")?,
        })
    }
}
