use serde::Deserialize;

const INSECURE_DEFAULT_SECRET: &str = "default-secret-key-change-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_days: i64,
    pub proof_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub gemini_api_key: String,
    /// Public base URL used to build links to uploaded and generated artifacts.
    pub server_url: String,
    pub cors_origin: String,
    pub upload_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, falling back to an insecure default");
            INSECURE_DEFAULT_SECRET.into()
        });
        let jwt = JwtConfig {
            secret,
            access_ttl_days: std::env::var("JWT_ACCESS_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
            proof_ttl_minutes: std::env::var("JWT_PROOF_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(10),
        };

        // Without the provider key every generation endpoint would fail, so
        // refuse to start instead of limping along.
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY is not set; refusing to start"))?;

        Ok(Self {
            database_url,
            jwt,
            gemini_api_key,
            server_url: std::env::var("SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3055".into()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
        })
    }
}
