use crate::StravaError;

pub const DEFAULT_BASE_URL: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://www.strava.com/api/v3/oauth/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost/";
pub const OAUTH_SCOPE: &str = "profile:read_all,activity:read_all";

/// Strava endpoints used by the exporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub redirect_uri: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.into(),
            token_url: DEFAULT_TOKEN_URL.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.into(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, StravaError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StravaError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Self {
            base_url: get("STRAVA_API_BASE_URL").unwrap_or(defaults.base_url),
            authorize_url: get("STRAVA_AUTHORIZE_URL").unwrap_or(defaults.authorize_url),
            token_url: get("STRAVA_TOKEN_URL").unwrap_or(defaults.token_url),
            redirect_uri: get("STRAVA_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
        };
        for (name, value) in [
            ("STRAVA_API_BASE_URL", &cfg.base_url),
            ("STRAVA_AUTHORIZE_URL", &cfg.authorize_url),
            ("STRAVA_TOKEN_URL", &cfg.token_url),
        ] {
            reqwest::Url::parse(value)
                .map_err(|e| StravaError::Config(format!("{name} is not a valid URL: {e}")))?;
        }
        Ok(cfg)
    }

    /// Page the user opens in a browser to grant read access and obtain a code.
    pub fn authorization_url(&self, client_id: &str) -> Result<String, StravaError> {
        let url = reqwest::Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", client_id),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("approval_prompt", "force"),
                ("scope", OAUTH_SCOPE),
            ],
        )
        .map_err(|e| StravaError::Config(format!("invalid authorize url: {e}")))?;
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_defaults_to_strava() {
        let cfg = ApiConfig::from_env_with(|_| None).expect("cfg");
        assert_eq!(cfg, ApiConfig::default());
        assert_eq!(cfg.base_url, "https://www.strava.com/api/v3");
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "STRAVA_API_BASE_URL" => Some("http://localhost:9000/api".into()),
            "STRAVA_TOKEN_URL" => Some("http://localhost:9000/token".into()),
            _ => None,
        };
        let cfg = ApiConfig::from_env_with(get).expect("cfg");
        assert_eq!(cfg.base_url, "http://localhost:9000/api");
        assert_eq!(cfg.token_url, "http://localhost:9000/token");
        assert_eq!(cfg.authorize_url, DEFAULT_AUTHORIZE_URL);
    }

    #[test]
    fn from_env_rejects_invalid_url() {
        let get = |k: &str| match k {
            "STRAVA_TOKEN_URL" => Some("not a url".into()),
            _ => None,
        };
        let res = ApiConfig::from_env_with(get);
        assert!(matches!(res, Err(StravaError::Config(_))));
    }

    #[test]
    fn authorization_url_carries_oauth_params() {
        let url = ApiConfig::default()
            .authorization_url("12345")
            .expect("url");
        assert!(url.starts_with("https://www.strava.com/oauth/authorize?"));
        assert!(url.contains("client_id=12345"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("approval_prompt=force"));
        assert!(url.contains("scope=profile%3Aread_all%2Cactivity%3Aread_all"));
    }
}
