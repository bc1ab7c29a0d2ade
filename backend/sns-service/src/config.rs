/// Configuration management for the SNS service
///
/// Everything is read from environment variables (a `.env` file is loaded by
/// `main` in development). Production refuses permissive CORS and the
/// development-only HS256 token secret.
use db_pool::env_utils::{non_empty_env, parse_env_flag, parse_env_with_default};
use db_pool::DbConfig;
use identity_jwt::TokenVerifier;
use s3_utils::S3Config;

pub const SERVICE_NAME: &str = "sns-service";

/// 5 MiB
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub storage: S3Config,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub pool: DbConfig,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub public_key_pem: Option<String>,
    pub hs256_secret: Option<String>,
    pub issuer: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("public_key_pem", &self.public_key_pem.as_ref().map(|_| "[SET]"))
            .field("hs256_secret", &self.hs256_secret.as_ref().map(|_| "[REDACTED]"))
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl AuthConfig {
    /// Build the token verifier, preferring the RS256 public key.
    pub fn verifier(&self) -> Result<TokenVerifier, String> {
        let issuer = self.issuer.as_deref();
        if let Some(pem) = &self.public_key_pem {
            return TokenVerifier::from_rsa_pem(pem, issuer).map_err(|e| e.to_string());
        }
        if let Some(secret) = &self.hs256_secret {
            return TokenVerifier::from_hs256_secret(secret.as_bytes(), issuer)
                .map_err(|e| e.to_string());
        }
        Err("AUTH_JWT_PUBLIC_KEY_PEM or AUTH_JWT_HS256_SECRET must be set".to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let cors = {
            let allowed_origins = match non_empty_env("CORS_ALLOWED_ORIGINS") {
                Some(value) => value,
                None if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                None => "http://localhost:3000".to_string(),
            };

            if production && allowed_origins.split(',').any(|o| o.trim() == "*") {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let database = DatabaseConfig {
            pool: DbConfig::from_env(SERVICE_NAME).map_err(|e| e.to_string())?,
            run_migrations: parse_env_flag("DATABASE_RUN_MIGRATIONS", false),
        };

        let storage = {
            let bucket = non_empty_env("S3_BUCKET").ok_or("S3_BUCKET must be set")?;
            let region = non_empty_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string());
            let endpoint = non_empty_env("S3_ENDPOINT");
            let path_style = parse_env_flag("S3_PATH_STYLE", endpoint.is_some());
            let public_base_url = non_empty_env("S3_PUBLIC_BASE_URL").unwrap_or_else(|| {
                default_public_base_url(&bucket, &region, endpoint.as_deref(), path_style)
            });

            S3Config {
                bucket,
                region,
                endpoint,
                public_base_url,
                path_style,
            }
        };

        let auth = AuthConfig {
            public_key_pem: non_empty_env("AUTH_JWT_PUBLIC_KEY_PEM").map(|pem| pem.replace("\\n", "\n")),
            hs256_secret: non_empty_env("AUTH_JWT_HS256_SECRET"),
            issuer: non_empty_env("AUTH_JWT_ISSUER"),
        };
        if production && auth.public_key_pem.is_none() {
            return Err("AUTH_JWT_PUBLIC_KEY_PEM must be set in production".to_string());
        }

        let upload = UploadConfig {
            max_bytes: parse_env_with_default("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES),
        };
        if upload.max_bytes == 0 {
            return Err("UPLOAD_MAX_BYTES must be greater than zero".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_with_default("APP_PORT", 8080),
            },
            cors,
            database,
            storage,
            auth,
            upload,
        })
    }
}

fn default_public_base_url(
    bucket: &str,
    region: &str,
    endpoint: Option<&str>,
    path_style: bool,
) -> String {
    match endpoint {
        Some(endpoint) if path_style => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "APP_ENV",
        "APP_PORT",
        "CORS_ALLOWED_ORIGINS",
        "DATABASE_URL",
        "DATABASE_RUN_MIGRATIONS",
        "S3_BUCKET",
        "S3_ENDPOINT",
        "S3_PATH_STYLE",
        "S3_PUBLIC_BASE_URL",
        "AUTH_JWT_PUBLIC_KEY_PEM",
        "AUTH_JWT_HS256_SECRET",
        "UPLOAD_MAX_BYTES",
    ];

    fn reset_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
        std::env::set_var("DATABASE_URL", "postgres://localhost/sns_test");
        std::env::set_var("S3_BUCKET", "uploads");
    }

    #[test]
    #[serial]
    fn test_development_defaults() {
        reset_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.cors.allowed_origins, "http://localhost:3000");
        assert!(!config.database.run_migrations);
        assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
        assert_eq!(
            config.storage.public_base_url,
            "https://uploads.s3.us-east-1.amazonaws.com"
        );
    }

    #[test]
    #[serial]
    fn test_custom_endpoint_defaults_to_path_style() {
        reset_env();
        std::env::set_var("S3_ENDPOINT", "http://localhost:9000/");

        let config = Config::from_env().unwrap();
        assert!(config.storage.path_style);
        assert_eq!(config.storage.public_base_url, "http://localhost:9000/uploads");
        std::env::remove_var("S3_ENDPOINT");
    }

    #[test]
    #[serial]
    fn test_production_rejects_wildcard_cors() {
        reset_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://app.example.com, *");

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("cannot be '*'"));
        reset_env();
    }

    #[test]
    #[serial]
    fn test_production_requires_public_key() {
        reset_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://app.example.com");
        std::env::set_var("AUTH_JWT_HS256_SECRET", "local-development-secret-0123456789");

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("AUTH_JWT_PUBLIC_KEY_PEM"));
        reset_env();
    }

    #[test]
    #[serial]
    fn test_missing_bucket_is_an_error() {
        reset_env();
        std::env::remove_var("S3_BUCKET");

        assert!(Config::from_env().is_err());
        reset_env();
    }

    #[test]
    fn test_verifier_requires_a_key() {
        let auth = AuthConfig {
            public_key_pem: None,
            hs256_secret: None,
            issuer: None,
        };
        assert!(auth.verifier().is_err());

        let auth = AuthConfig {
            hs256_secret: Some("local-development-secret-0123456789".to_string()),
            ..auth
        };
        assert!(auth.verifier().is_ok());
    }
}
