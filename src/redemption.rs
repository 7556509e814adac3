//! One-time code redemption.
//!
//! Only the request shape and the status mapping live here. The HTTP call
//! belongs to the host application.

use ndauth_codec::{escape, parse_url, Url};
use url::Position;

use crate::config::PartnerProfile;
use crate::error::ConfigError;
use crate::handshake::LoginResult;

pub const REDEMPTION_PATH: &str = "/ThirdCheckCode.aspx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRequest {
    pub host: String,
    pub code: String,
    pub client_id: String,
}

impl RedemptionRequest {
    pub fn new(
        host: impl Into<String>,
        code: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            code: code.into(),
            client_id: client_id.into(),
        }
    }

    /// Redemption request for an issued token, if the profile names a
    /// redemption host.
    pub fn for_login(profile: &PartnerProfile, login: &LoginResult) -> Option<Self> {
        let host = profile.redemption_host.as_deref()?;
        let code = login.token()?;
        Some(Self::new(host, code, profile.app_id.as_str()))
    }

    /// `https://<host>/ThirdCheckCode.aspx?code=<code>&clientid=<client_id>`
    ///
    /// # Errors
    /// Returns `ConfigError` if `host` does not form a valid URL, or if it
    /// carries anything besides a host and optional port.
    pub fn url(&self) -> Result<Url, ConfigError> {
        let mut url = parse_url(&format!("https://{}{REDEMPTION_PATH}", self.host))?;
        let authority = &url[Position::BeforeHost..Position::AfterPort];
        if !authority.eq_ignore_ascii_case(&self.host)
            || !url.username().is_empty()
            || url.password().is_some()
            || url.path() != REDEMPTION_PATH
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(ConfigError::InvalidRedemptionHost {
                host: self.host.clone(),
            });
        }
        url.set_query(Some(&format!(
            "code={}&clientid={}",
            escape(&self.code),
            escape(&self.client_id)
        )));
        Ok(url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionStatus {
    Redeemed,
    Failed,
}

/// 2xx redeems; everything else fails.
pub fn classify_status(status: u16) -> RedemptionStatus {
    if (200..300).contains(&status) {
        RedemptionStatus::Redeemed
    } else {
        RedemptionStatus::Failed
    }
}
