use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::SettingsError;

pub const DEFAULT_SETTINGS_FILE: &str = "feedback.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    /// Unset means requests wait indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// Unset keeps the session in memory only.
    pub session_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".into(),
            request_timeout_secs: None,
            session_path: default_session_path(),
            log_filter: "info".into(),
        }
    }
}

impl ClientSettings {
    pub fn server_url(&self) -> Result<Url, SettingsError> {
        Url::parse(self.server_url.trim()).map_err(|source| SettingsError::InvalidServerUrl {
            url: self.server_url.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    session_path: Option<PathBuf>,
    log_filter: Option<String>,
}

pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join("feedback_client").join("session.json"))
}

/// Defaults, then the settings file, then environment overrides.
///
/// An explicitly named file must exist; the default `feedback.toml` in the
/// working directory is optional.
pub fn load_settings(config_path: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    let mut settings = ClientSettings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file_settings(&mut settings, &raw, &path)?,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => return Err(SettingsError::Read { path, source }),
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings.server_url()?;
    Ok(settings)
}

fn apply_file_settings(
    settings: &mut ClientSettings,
    raw: &str,
    path: &Path,
) -> Result<(), SettingsError> {
    let file_cfg: FileSettings = toml::from_str(raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    if let Some(v) = file_cfg.session_path {
        settings.session_path = Some(v);
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = read("FEEDBACK_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = read("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = read("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = read("APP__SESSION_PATH") {
        settings.session_path = Some(PathBuf::from(v));
    }

    if let Some(v) = read("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_local_service_without_timeout() {
        let settings = ClientSettings::default();
        assert_eq!(settings.server_url, "http://localhost:3000");
        assert!(settings.request_timeout().is_none());
        assert!(settings.server_url().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = ClientSettings::default();
        apply_file_settings(
            &mut settings,
            r#"
                server_url = "https://feedback.example.com"
                request_timeout_secs = 15
                session_path = "/tmp/fb/session.json"
            "#,
            Path::new("feedback.toml"),
        )
        .expect("parse");

        assert_eq!(settings.server_url, "https://feedback.example.com");
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(
            settings.session_path,
            Some(PathBuf::from("/tmp/fb/session.json"))
        );
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut settings = ClientSettings::default();
        let err = apply_file_settings(&mut settings, "server_url = [", Path::new("bad.toml"))
            .expect_err("must fail");
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn app_prefixed_env_wins_and_bad_timeout_is_ignored() {
        let mut settings = ClientSettings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                ("FEEDBACK_SERVER_URL", "http://a:1"),
                ("APP__SERVER_URL", "http://b:2"),
                ("APP__REQUEST_TIMEOUT_SECS", "soon"),
                ("APP__LOG_FILTER", "debug"),
            ]),
        );
        assert_eq!(settings.server_url, "http://b:2");
        assert!(settings.request_timeout_secs.is_none());
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let settings = ClientSettings {
            request_timeout_secs: Some(0),
            ..ClientSettings::default()
        };
        assert!(settings.request_timeout().is_none());
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let settings = ClientSettings {
            server_url: "not a url".into(),
            ..ClientSettings::default()
        };
        assert!(matches!(
            settings.server_url(),
            Err(SettingsError::InvalidServerUrl { .. })
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_settings(Some(Path::new("/definitely/not/here/feedback.toml")))
            .expect_err("must fail");
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
