//! OAuth credentials and token cached on disk between runs.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ExportResult;

pub const DEFAULT_SETTINGS_FILE: &str = ".strava_export_settings.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_code: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Settings {
    /// Missing file yields empty settings; a malformed one is an error.
    pub fn load(path: &Path) -> ExportResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                info!(path = %path.display(), "loading settings");
                Ok(serde_json::from_str(&text)?)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> ExportResult<()> {
        info!(path = %path.display(), "saving settings");
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }

    pub fn client_id(&self) -> Option<&str> {
        non_empty(&self.client_id)
    }

    pub fn client_secret(&self) -> Option<&str> {
        non_empty(&self.client_secret)
    }

    pub fn client_code(&self) -> Option<&str> {
        non_empty(&self.client_code)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(&self.refresh_token)
    }

    pub fn access_token(&self) -> Option<SecretString> {
        non_empty(&self.access_token).map(|t| SecretString::new(t.into()))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
