//! Outbound launch request to the partner app.

use chrono::Utc;
use ndauth_codec::{Parameters, Url, UrlCodec};
use ndauth_crypto::{md5_hex, SignatureEngine};
use tracing::debug;

use crate::config::PartnerProfile;
use crate::error::ConfigError;

pub const APP_ID_KEY: &str = "appId";
pub const APP_SIGN_KEY: &str = "appSign";
pub const TIMESTAMP_KEY: &str = "timestamp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub app_id: String,
    /// Bundle identifier of the calling app; hashed into `appSign`.
    pub bundle_id: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl LaunchRequest {
    /// Request stamped with the current time.
    pub fn new(app_id: impl Into<String>, bundle_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            bundle_id: bundle_id.into(),
            timestamp: Utc::now().timestamp(),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn app_sign(&self) -> String {
        md5_hex(self.bundle_id.as_bytes())
    }

    /// Unsigned launch parameters.
    pub fn parameters(&self) -> Parameters {
        Parameters::new()
            .with(APP_ID_KEY, self.app_id.as_str())
            .with(APP_SIGN_KEY, self.app_sign())
            .with(TIMESTAMP_KEY, self.timestamp)
    }

    pub fn signed_parameters(&self, engine: &SignatureEngine) -> Parameters {
        engine.sign(&self.parameters())
    }

    /// The partner URL with signed launch parameters appended.
    ///
    /// # Errors
    /// Returns `ConfigError` if the profile's `partner_url` does not parse.
    pub fn into_url(self, profile: &PartnerProfile) -> Result<Url, ConfigError> {
        let base = profile.partner_url()?;
        let signed = self.signed_parameters(&profile.launch_engine());
        let url = UrlCodec::new(profile.encoding).encode(&base, Some(&signed));
        debug!(app_id = %self.app_id, scheme = url.scheme(), "built launch url");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use ndauth_crypto::{FixedFields, SignatureStrategy, SIGN_KEY};

    use super::*;

    fn profile() -> PartnerProfile {
        PartnerProfile::new(
            "aq20200807",
            "nd.aqcenter://oncetoken/auth",
            SignatureStrategy::FixedFields(FixedFields::callback()),
            SignatureStrategy::FixedFields(FixedFields::launch()),
        )
    }

    fn request() -> LaunchRequest {
        LaunchRequest::new("aq20200807", "com.madao.NDAuthLoginDemo").with_timestamp(1_597_045)
    }

    #[test]
    fn app_sign_is_md5_of_bundle_id() {
        assert_eq!(request().app_sign(), "bf5b19ccbb731fdfd427bf09e7cb5256");
    }

    #[test]
    fn new_stamps_current_time() {
        let before = Utc::now().timestamp();
        let request = LaunchRequest::new("a", "b");
        assert!(request.timestamp >= before);
        assert!(request.timestamp <= Utc::now().timestamp());
    }

    #[test]
    fn signed_parameters_carry_launch_signature() {
        let signed = request().signed_parameters(&profile().launch_engine());
        assert_eq!(signed.get_str(SIGN_KEY), Some("d467b4fccbd98bbb501d3feea9953547"));
        assert_eq!(signed.len(), 4);
    }

    #[test]
    fn builds_reference_url() {
        let url = request().into_url(&profile()).unwrap();
        assert_eq!(
            url.as_str(),
            "nd.aqcenter://oncetoken/auth?appId=aq20200807\
             &appSign=bf5b19ccbb731fdfd427bf09e7cb5256\
             &sign=d467b4fccbd98bbb501d3feea9953547&timestamp=1597045"
        );
    }

    #[test]
    fn invalid_partner_url_is_an_error() {
        let mut profile = profile();
        profile.partner_url = "oncetoken/auth".to_string();
        assert!(request().into_url(&profile).is_err());
    }
}
