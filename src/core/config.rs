use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub cleanup: CleanupConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Session token settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens
    pub session_secret: String,
    pub session_ttl: Duration,
    /// Mark the session cookie `Secure` (enable behind HTTPS)
    pub cookie_secure: bool,
}

// Hand-written so the secret never reaches the logs
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &"***")
            .field("session_ttl", &self.session_ttl)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Local filesystem locations for photos and choice lists
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory; each report gets `<upload_dir>/<report_number>/`
    pub upload_dir: PathBuf,
    /// Directory holding `locations.csv`, `animals.csv`, `tasks.csv`, `roster.csv`
    pub data_dir: PathBuf,
    /// Minimum number of photos a submission must carry
    pub min_photo_count: usize,
}

/// Who appears in the `From:` header of outgoing mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderMode {
    /// Always use `MAIL_DEFAULT_SENDER`
    Fixed,
    /// Use the acting user's address when they have one
    User,
}

#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub default_sender: String,
    pub municipal_contact: String,
    pub sender_mode: SenderMode,
    /// Domain used to guess a reporter address when their account is gone
    pub fallback_domain: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "***"))
            .field("default_sender", &self.default_sender)
            .field("municipal_contact", &self.municipal_contact)
            .field("sender_mode", &self.sender_mode)
            .field("fallback_domain", &self.fallback_domain)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub retention_days: i64,
    pub enabled: bool,
    /// Local hour of day (0-23) the scheduled sweep runs at
    pub hour: u32,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String>
where
    T: ToString,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid value", name))
}

fn parse_bool(name: &str, default: bool) -> Result<bool, String> {
    match env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("{} must be a boolean", name)),
        },
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            mail: MailConfig::from_env()?,
            cleanup: CleanupConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024; // 50MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", Self::DEFAULT_MAX_UPLOAD_BYTES)?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_upload_bytes,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // A single SQLite file rarely benefits from a wide pool
    const DEFAULT_URL: &'static str = "sqlite://data/hunting.db";
    const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_string());

        Ok(Self {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_var("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_var("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 3600;
    const MIN_SECRET_LEN: usize = 32;

    pub fn from_env() -> Result<Self, String> {
        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| "SESSION_SECRET environment variable is required".to_string())?;

        if session_secret.len() < Self::MIN_SECRET_LEN {
            return Err(format!(
                "SESSION_SECRET must be at least {} bytes",
                Self::MIN_SECRET_LEN
            ));
        }

        let ttl_secs = parse_var("SESSION_TTL_SECS", Self::DEFAULT_SESSION_TTL_SECS)?;

        Ok(Self {
            session_secret,
            session_ttl: Duration::from_secs(ttl_secs),
            cookie_secure: parse_bool("SESSION_COOKIE_SECURE", false)?,
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let min_photo_count = parse_var("MIN_PHOTO_COUNT", 1usize)?;

        Ok(Self {
            upload_dir: PathBuf::from(upload_dir),
            data_dir: PathBuf::from(data_dir),
            min_photo_count,
        })
    }
}

impl MailConfig {
    /// Username shipped in sample configs; treated as "not configured"
    const PLACEHOLDER_USERNAME: &'static str = "your-email@gmail.com";

    pub fn from_env() -> Result<Self, String> {
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let smtp_port = parse_var("SMTP_PORT", 587u16)?;
        let smtp_username = env::var("SMTP_USERNAME").ok().filter(|s| !s.is_empty());
        let smtp_password = env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty());

        let default_sender = env::var("MAIL_DEFAULT_SENDER")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| smtp_username.clone())
            .unwrap_or_else(|| "noreply@localhost".to_string());

        let municipal_contact = env::var("MUNICIPAL_CONTACT_EMAIL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_sender.clone());

        let sender_mode = match env::var("MAIL_SENDER_MODE")
            .unwrap_or_else(|_| "user".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "fixed" => SenderMode::Fixed,
            "user" => SenderMode::User,
            other => {
                return Err(format!(
                    "MAIL_SENDER_MODE must be 'fixed' or 'user', got '{}'",
                    other
                ))
            }
        };

        let fallback_domain =
            env::var("MAIL_FALLBACK_DOMAIN").unwrap_or_else(|_| "gmail.com".to_string());

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            default_sender,
            municipal_contact,
            sender_mode,
            fallback_domain,
        })
    }

    /// Mail goes out only with a real SMTP username
    pub fn is_enabled(&self) -> bool {
        self.smtp_username
            .as_deref()
            .is_some_and(|u| u != Self::PLACEHOLDER_USERNAME)
    }
}

impl CleanupConfig {
    /// A century of retention; anything longer means "keep forever"
    pub const MAX_RETENTION_DAYS: i64 = 36_500;

    fn check_retention_days(days: i64) -> Result<i64, String> {
        if !(0..=Self::MAX_RETENTION_DAYS).contains(&days) {
            return Err(format!(
                "PHOTO_RETENTION_DAYS must be between 0 and {}",
                Self::MAX_RETENTION_DAYS
            ));
        }
        Ok(days)
    }

    pub fn from_env() -> Result<Self, String> {
        let retention_days =
            Self::check_retention_days(parse_var("PHOTO_RETENTION_DAYS", 60i64)?)?;

        let hour = parse_var("PHOTO_CLEANUP_HOUR", 2u32)?;
        if hour > 23 {
            return Err("PHOTO_CLEANUP_HOUR must be between 0 and 23".to_string());
        }

        Ok(Self {
            retention_days,
            enabled: parse_bool("PHOTO_CLEANUP_ENABLED", true)?,
            hour,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Huntlog API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Hunting activity reports for the association".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config(username: Option<&str>) -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.org".to_string(),
            smtp_port: 587,
            smtp_username: username.map(String::from),
            smtp_password: None,
            default_sender: "office@example.org".to_string(),
            municipal_contact: "town@example.org".to_string(),
            sender_mode: SenderMode::User,
            fallback_domain: "gmail.com".to_string(),
        }
    }

    #[test]
    fn test_mail_enabled_requires_real_username() {
        assert!(!mail_config(None).is_enabled());
        assert!(!mail_config(Some("your-email@gmail.com")).is_enabled());
        assert!(mail_config(Some("office@example.org")).is_enabled());
    }

    #[test]
    fn test_swagger_credentials() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert!(swagger.credentials().is_none());

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials().as_deref(), Some("admin:secret"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let auth = AuthConfig {
            session_secret: "super-secret-value".to_string(),
            session_ttl: Duration::from_secs(60),
            cookie_secure: false,
        };
        assert!(!format!("{:?}", auth).contains("super-secret-value"));
    }

    #[test]
    fn test_retention_days_bounds() {
        assert_eq!(CleanupConfig::check_retention_days(0), Ok(0));
        assert_eq!(CleanupConfig::check_retention_days(60), Ok(60));
        assert!(CleanupConfig::check_retention_days(CleanupConfig::MAX_RETENTION_DAYS).is_ok());
        assert!(CleanupConfig::check_retention_days(-1).is_err());
        assert!(CleanupConfig::check_retention_days(100_000_000).is_err());
    }
}
