use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// `dev` enables the admin reset endpoint
    #[serde(default)]
    pub platform: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub database_name: String,
    /// Keep everything in process memory instead of Postgres
    #[serde(default)]
    pub in_memory: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            port: default_db_port(),
            host: default_host(),
            database_name: String::new(),
            in_memory: false,
        }
    }
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT authentication settings
///
/// All durations are in seconds. The secret is read once at startup and
/// never changes for the lifetime of the process.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    /// Upper bound for a lifetime requested by the client at login
    #[serde(default = "default_access_token_expiry")]
    pub max_access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

// Keep the secret out of debug output.
impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("max_access_token_expiry", &self.max_access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

/// Longest lifetime accepted for any token: ten years
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 3600;

impl JwtSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.issuer".to_string()));
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.access_token_expiry must be positive".to_string(),
            ));
        }
        if self.max_access_token_expiry < self.access_token_expiry {
            return Err(ConfigError::InvalidValue(
                "jwt.max_access_token_expiry must not be below jwt.access_token_expiry".to_string(),
            ));
        }
        if self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.refresh_token_expiry must be positive".to_string(),
            ));
        }
        for (key, value) in [
            ("jwt.max_access_token_expiry", self.max_access_token_expiry),
            ("jwt.refresh_token_expiry", self.refresh_token_expiry),
        ] {
            if value > MAX_TOKEN_LIFETIME_SECS {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be at most {} seconds",
                    key, MAX_TOKEN_LIFETIME_SECS
                )));
            }
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_static_dir() -> String {
    "./public".to_string()
}

fn default_issuer() -> String {
    "chirpy".to_string()
}

fn default_access_token_expiry() -> i64 {
    3600
}

fn default_refresh_token_expiry() -> i64 {
    60 * 24 * 3600
}

/// Load settings from an optional `configuration` file, then `APP_*`
/// environment variables (`APP_JWT__SECRET`, `APP_DATABASE__IN_MEMORY`, ...).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.port", 8080)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.jwt.validate()?;
    Ok(settings)
}
