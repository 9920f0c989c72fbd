//! Access token acquisition.
//!
//! The authenticator fills in missing client credentials, probes the stored
//! token, and when it is missing or rejected obtains a new one: first through
//! the stored refresh token, then through the interactive authorization code
//! flow. Every change is written back to the settings file immediately.

use std::io::{self, BufRead, Write};
use std::path::Path;

use strava_client::config::ApiConfig;
use strava_client::{StravaClient, TokenGrant, TokenResponse};
use tracing::{debug, info, warn};

use crate::error::{ExportError, ExportResult};
use crate::settings::Settings;

/// A value the authenticator needs from the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    ClientId,
    ClientSecret,
    AuthorizationCode { authorize_url: String },
}

impl Credential {
    pub fn label(&self) -> &'static str {
        match self {
            Credential::ClientId => "client id",
            Credential::ClientSecret => "client secret",
            Credential::AuthorizationCode { .. } => "authorization code",
        }
    }
}

/// Source of interactively supplied credentials.
pub trait CredentialProvider: Send {
    fn request(&mut self, credential: &Credential) -> ExportResult<String>;
}

/// Prompts on stdout and reads one line from stdin.
#[derive(Debug, Default)]
pub struct ConsoleCredentials;

impl CredentialProvider for ConsoleCredentials {
    fn request(&mut self, credential: &Credential) -> ExportResult<String> {
        let mut out = io::stdout().lock();
        match credential {
            Credential::ClientId => {
                write!(out, "Enter your client id from https://www.strava.com/settings/api: ")?
            }
            Credential::ClientSecret => write!(
                out,
                "Enter your client secret from https://www.strava.com/settings/api: "
            )?,
            Credential::AuthorizationCode { authorize_url } => {
                writeln!(out, "Open this page and authorize the app: {authorize_url}")?;
                writeln!(
                    out,
                    "You will land on a URL carrying a `code` parameter; paste that code (or the whole URL) below."
                )?;
                write!(out, "Authorization code: ")?;
            }
        }
        out.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

/// Accepts either the bare code or the full redirect URL it was pasted from.
pub fn extract_authorization_code(input: &str) -> String {
    let input = input.trim();
    reqwest::Url::parse(input)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "code")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_else(|| input.to_string())
}

pub struct Authenticator<'a> {
    client: &'a dyn StravaClient,
    config: &'a ApiConfig,
    settings_path: &'a Path,
}

impl<'a> Authenticator<'a> {
    pub fn new(client: &'a dyn StravaClient, config: &'a ApiConfig, settings_path: &'a Path) -> Self {
        Self {
            client,
            config,
            settings_path,
        }
    }

    /// Returns settings holding an access token the API accepted or just issued.
    pub async fn authenticate(
        &self,
        mut settings: Settings,
        credentials: &mut dyn CredentialProvider,
    ) -> ExportResult<Settings> {
        let client_id = match settings.client_id() {
            Some(id) => id.to_string(),
            None => {
                let id = require(credentials, &Credential::ClientId)?;
                settings.client_id = Some(id.clone());
                settings.save(self.settings_path)?;
                id
            }
        };
        let client_secret = match settings.client_secret() {
            Some(secret) => secret.to_string(),
            None => {
                let secret = require(credentials, &Credential::ClientSecret)?;
                settings.client_secret = Some(secret.clone());
                settings.save(self.settings_path)?;
                secret
            }
        };

        if settings.client_code().is_some() && self.token_is_valid(&settings).await? {
            debug!("stored access token is still valid");
            return Ok(settings);
        }

        if let Some(refresh_token) = settings.refresh_token().map(str::to_string) {
            let grant = TokenGrant::refresh(&client_id, &client_secret, refresh_token);
            match self.client.exchange_token(&grant).await {
                Ok(token) => {
                    info!("access token refreshed");
                    self.store_token(&mut settings, token)?;
                    return Ok(settings);
                }
                Err(e) if e.is_client_error() => {
                    warn!(error = %e, "refresh token rejected, falling back to authorization");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let authorize_url = self.config.authorization_url(&client_id)?;
        let code = extract_authorization_code(&require(
            credentials,
            &Credential::AuthorizationCode { authorize_url },
        )?);
        settings.client_code = Some(code.clone());
        settings.save(self.settings_path)?;

        let grant = TokenGrant::authorization_code(&client_id, &client_secret, code);
        let token = self.client.exchange_token(&grant).await?;
        info!("obtained a new access token");
        self.store_token(&mut settings, token)?;
        Ok(settings)
    }

    /// A missing token is invalid without asking; 401/403 means expired.
    async fn token_is_valid(&self, settings: &Settings) -> ExportResult<bool> {
        let Some(token) = settings.access_token() else {
            return Ok(false);
        };
        info!("testing if token is still valid");
        match self.client.get_athlete(&token).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_unauthorized() => {
                info!("access token expired");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn store_token(&self, settings: &mut Settings, token: TokenResponse) -> ExportResult<()> {
        settings.access_token = Some(token.access_token);
        if token.refresh_token.is_some() {
            settings.refresh_token = token.refresh_token;
        }
        settings.save(self.settings_path)
    }
}

fn require(
    credentials: &mut dyn CredentialProvider,
    credential: &Credential,
) -> ExportResult<String> {
    let value = credentials.request(credential)?.trim().to_string();
    if value.is_empty() {
        return Err(ExportError::MissingCredential(credential.label()));
    }
    Ok(value)
}
