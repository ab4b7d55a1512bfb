use std::{collections::HashMap, fs};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub session_database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            session_database_url: "sqlite://./data/session.db".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("client.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("session_database_url") {
                settings.session_database_url = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Ok(v) = std::env::var("SESSION_DATABASE_URL") {
        settings.session_database_url = v;
    }
    if let Ok(v) = std::env::var("APP__SESSION_DATABASE_URL") {
        settings.session_database_url = v;
    }

    settings
}

/// Accepts a plain file path as a shorthand for a sqlite URL. Missing
/// parent directories are created by the storage layer.
pub fn normalize_session_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().session_database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
