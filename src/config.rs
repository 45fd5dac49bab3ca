use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string. `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    /// Origin of the client allowed to call the API cross-origin.
    pub cors_origin: String,
    /// Answer an empty listing with 500 "No users found" instead of `[]`.
    pub empty_list_is_error: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: "0.0.0.0".into(),
            port: 8080,
            cors_origin: "http://localhost:4200".into(),
            empty_list_is_error: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`; unset or blank keys take the default,
    /// malformed values are an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("APP_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("APP_PORT={v} is not a valid port"))?,
            None => defaults.port,
        };
        let empty_list_is_error = match var("EMPTY_LIST_IS_ERROR") {
            Some(v) => parse_flag(&v).with_context(|| format!("EMPTY_LIST_IS_ERROR={v}"))?,
            None => defaults.empty_list_is_error,
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            host: var("APP_HOST").unwrap_or(defaults.host),
            port,
            cors_origin: var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            empty_list_is_error,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected true/false, 1/0, yes/no or on/off, got {other:?}"),
    }
}
