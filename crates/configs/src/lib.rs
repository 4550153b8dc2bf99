use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// Postgres connection settings. An empty `url` selects the file-backed document store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify bearer tokens.
    #[serde(default)]
    pub access_token_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { access_token_secret: String::new(), token_ttl_secs: default_token_ttl() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_documents_file")]
    pub documents_file: String,
    /// JSON array inserted into `services` when that collection is empty.
    #[serde(default)]
    pub seed_services_file: Option<String>,
    /// Let upserts with no scoping parameters update the first document of a collection.
    #[serde(default)]
    pub allow_unscoped_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            documents_file: default_documents_file(),
            seed_services_file: None,
            allow_unscoped_writes: false,
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 5000 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_token_ttl() -> u64 { 24 * 60 * 60 }
fn default_data_dir() -> String { "data".into() }
fn default_documents_file() -> String { "data/documents.json".into() }

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    from_toml_str(&content)
}

pub fn from_toml_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`) when it exists, otherwise build from the environment.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            Self::from_lookup(|k| std::env::var(k).ok())
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build a configuration from key lookups named like the environment variables.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(host) = lookup("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = lookup("PORT").or_else(|| lookup("SERVER_PORT")).and_then(|p| p.parse().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            cfg.database.url = url;
        }
        if let Some(secret) = lookup("ACCESS_TOKEN_SECRET") {
            cfg.auth.access_token_secret = secret;
        }
        if let Some(ttl) = lookup("TOKEN_TTL_SECS").and_then(|v| v.parse().ok()) {
            cfg.auth.token_ttl_secs = ttl;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            cfg.store.documents_file = format!("{}/documents.json", dir.trim_end_matches('/'));
            cfg.store.data_dir = dir;
        }
        if let Some(seed) = lookup("SEED_SERVICES_FILE") {
            cfg.store.seed_services_file = Some(seed);
        }
        if let Some(flag) = lookup("ALLOW_UNSCOPED_WRITES") {
            cfg.store.allow_unscoped_writes = matches!(flag.trim(), "1" | "true" | "yes");
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.normalize_with(|k| std::env::var(k).ok())
    }

    /// Normalize every section, filling empty secrets/URLs through `lookup`, then validate.
    pub fn normalize_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize()?;
        if self.database.url.trim().is_empty() {
            if let Some(url) = lookup("DATABASE_URL") {
                self.database.url = url;
            }
        }
        self.database.validate()?;
        if self.auth.access_token_secret.trim().is_empty() {
            if let Some(secret) = lookup("ACCESS_TOKEN_SECRET") {
                self.auth.access_token_secret = secret;
            }
        }
        self.auth.validate()?;
        self.store.validate()?;
        Ok(())
    }

    /// Whether documents live in Postgres rather than the local JSON file.
    pub fn uses_database(&self) -> bool {
        !self.database.url.trim().is_empty()
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Ok(());
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.access_token_secret.trim().is_empty() {
            return Err(anyhow!(
                "auth.access_token_secret is empty; set it in config.toml or ACCESS_TOKEN_SECRET"
            ));
        }
        if self.token_ttl_secs == 0 {
            return Err(anyhow!("auth.token_ttl_secs must be positive"));
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.documents_file.trim().is_empty() {
            return Err(anyhow!("store.documents_file must not be empty"));
        }
        Ok(())
    }
}
