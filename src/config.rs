use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_signup_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    /// `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub log_dir: String,

    /// Local hour (0..=23) of the daily attendance sync
    pub attendance_sync_hour: u32,

    // Seeded on first start when no admin exists
    pub admin_email: String,
    pub admin_password: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(key, default)
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a number"))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let config = Self {
            server_addr: var_or("SERVER_ADDR", "0.0.0.0:8081"),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parse_var("ACCESS_TOKEN_TTL", "900")?, // default 15 min
            refresh_token_ttl: parse_var("REFRESH_TOKEN_TTL", "604800")?, // default 7 days

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", "60")?,
            rate_signup_per_min: parse_var("RATE_SIGNUP_PER_MIN", "30")?,
            rate_refresh_per_min: parse_var("RATE_REFRESH_PER_MIN", "30")?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: var_or("API_PREFIX", "/api"),
            cors_allowed_origins: split_list(&var_or("CORS_ALLOWED_ORIGINS", "*")),
            upload_dir: var_or("UPLOAD_DIR", "uploads"),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", "10485760")?, // 10 MiB
            log_dir: var_or("LOG_DIR", "logs"),

            attendance_sync_hour: parse_var("ATTENDANCE_SYNC_HOUR", "12")?,

            admin_email: var_or("ADMIN_EMAIL", "admin@company.com"),
            admin_password: var_or("ADMIN_PASSWORD", "admin"),
        };

        if config.jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if let Some(origin) = config
            .cors_allowed_origins
            .iter()
            .find(|o| *o != "*" && !o.starts_with("http://") && !o.starts_with("https://"))
        {
            bail!("CORS_ALLOWED_ORIGINS entry {origin:?} must be * or an http(s) origin");
        }
        if config.attendance_sync_hour > 23 {
            bail!("ATTENDANCE_SYNC_HOUR must be between 0 and 23");
        }

        Ok(config)
    }
}

#[cfg(test)]
impl Config {
    /// Defaults for handler tests; nothing read from the environment.
    pub fn for_tests(upload_dir: &str) -> Self {
        Self {
            server_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 600,
            rate_signup_per_min: 600,
            rate_refresh_per_min: 600,
            rate_protected_per_min: 6000,
            api_prefix: "/api".into(),
            cors_allowed_origins: vec!["*".into()],
            upload_dir: upload_dir.into(),
            max_upload_bytes: 1024 * 1024,
            log_dir: "logs".into(),
            attendance_sync_hour: 12,
            admin_email: "admin@company.com".into(),
            admin_password: "admin".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_to_default() {
        let value: u32 = parse_var("VMS_TEST_UNSET_VARIABLE", "42").unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn origin_lists_are_split_and_trimmed() {
        assert_eq!(
            split_list(" http://a.test , https://b.test,,"),
            vec!["http://a.test".to_string(), "https://b.test".to_string()]
        );
        assert_eq!(split_list("*"), vec!["*".to_string()]);
    }

    #[test]
    fn parse_var_reports_the_key() {
        let err = parse_var::<u32>("VMS_TEST_UNSET_VARIABLE", "soon").unwrap_err();
        assert!(err.to_string().contains("VMS_TEST_UNSET_VARIABLE"));
    }
}
