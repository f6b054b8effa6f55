use serde::Deserialize;

/// Errors raised while loading configuration or resolving the configured gates.
/// Any of these aborts startup before the server binds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("database.url must be set when roles.models.permission = \"database\"")]
    MissingDatabaseUrl,
    #[error("roles.route_prefix must be empty or start with '/': {0:?}")]
    InvalidPrefix(String),
    #[error("unknown middleware identifier: {0:?}")]
    UnknownMiddleware(String),
    #[error("middleware {0:?} needs at least one argument")]
    MissingArgument(String),
    #[error("middleware {0:?} has an invalid level")]
    InvalidLevel(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub roles: RolesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Settings for the permissions GUI. Read once at startup and shared
/// read-only with every request through `web::Data<RolesConfig>`.
#[derive(Debug, Clone, Deserialize)]
pub struct RolesConfig {
    #[serde(default = "default_true")]
    pub gui_enabled: bool,

    /// Require an authenticated session on every action.
    #[serde(default = "default_true")]
    pub gui_auth_enabled: bool,

    /// Attach the gates named in `gui_middleware` to every action.
    #[serde(default)]
    pub gui_middleware_enabled: bool,

    #[serde(default)]
    pub gui_middleware: MiddlewareSpec,

    #[serde(default)]
    pub route_prefix: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default)]
    pub models: ModelsConfig,
}

/// A single middleware identifier or a list of them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MiddlewareSpec {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub permission: PermissionBinding,
}

/// Storage binding that backs the permission model.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PermissionBinding {
    #[default]
    Database,
    Memory,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    8
}

fn default_true() -> bool {
    true
}

fn default_login_path() -> String {
    "/login".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for MiddlewareSpec {
    fn default() -> Self {
        MiddlewareSpec::One("role:admin".to_string())
    }
}

impl MiddlewareSpec {
    pub fn identifiers(&self) -> Vec<String> {
        match self {
            MiddlewareSpec::One(id) => vec![id.clone()],
            MiddlewareSpec::Many(ids) => ids.clone(),
        }
    }
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            gui_enabled: true,
            gui_auth_enabled: true,
            gui_middleware_enabled: false,
            gui_middleware: MiddlewareSpec::default(),
            route_prefix: String::new(),
            login_path: default_login_path(),
            models: ModelsConfig::default(),
        }
    }
}

impl RolesConfig {
    /// Absolute path of a route below the configured prefix.
    pub fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.route_prefix, suffix)
    }

    /// Redirect target after every successful mutation.
    pub fn roles_index_path(&self) -> String {
        self.path("/roles")
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        let prefix = self.route_prefix.trim().trim_end_matches('/').to_string();
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::InvalidPrefix(self.route_prefix.clone()));
        }
        self.route_prefix = prefix;
        Ok(())
    }
}

impl Config {
    /// Load `config/default.toml`, then `config/local.toml`, then
    /// `ROLESGUI__*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("ROLESGUI").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validated()
    }

    /// Build a configuration from a TOML string only.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let cfg: Self = config.try_deserialize()?;
        cfg.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.database.url.is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.database.url = url;
            }
        }
        if self.roles.models.permission == PermissionBinding::Database && self.database.url.is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        self.roles.normalize()?;
        Ok(self)
    }
}
