//! Per-partner integration settings.

use ndauth_codec::{parse_url, EncoderOptions, Url};
use ndauth_crypto::{SignatureEngine, SignatureStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::redemption::RedemptionRequest;

/// `type` value of the login flow.
pub const LOGIN_TYPE: &str = "1000";

fn default_login_type() -> String {
    LOGIN_TYPE.to_string()
}

/// Everything needed to talk to one partner app.
///
/// Both signing strategies are required: partners disagree on how payloads
/// are built, so there is no safe default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerProfile {
    /// Application id issued by the partner platform.
    pub app_id: String,
    /// URL-scheme endpoint that launches the partner app.
    pub partner_url: String,
    /// `type` value that marks a login callback.
    #[serde(default = "default_login_type")]
    pub login_type: String,
    /// Strategy for verifying callbacks from the partner.
    pub callback_strategy: SignatureStrategy,
    /// Strategy for signing launch requests to the partner.
    pub launch_strategy: SignatureStrategy,
    #[serde(default)]
    pub encoding: EncoderOptions,
    /// Host serving the one-time code redemption endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redemption_host: Option<String>,
}

impl PartnerProfile {
    pub fn new(
        app_id: impl Into<String>,
        partner_url: impl Into<String>,
        callback_strategy: SignatureStrategy,
        launch_strategy: SignatureStrategy,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            partner_url: partner_url.into(),
            login_type: default_login_type(),
            callback_strategy,
            launch_strategy,
            encoding: EncoderOptions::default(),
            redemption_host: None,
        }
    }

    #[must_use]
    pub fn with_redemption_host(mut self, host: impl Into<String>) -> Self {
        self.redemption_host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: EncoderOptions) -> Self {
        self.encoding = encoding;
        self
    }

    /// Parse and validate a profile from JSON.
    ///
    /// # Errors
    /// Returns `ConfigError` if the JSON is malformed, a required field is
    /// empty, or `partner_url` is not a URL.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.is_empty() {
            return Err(ConfigError::MissingField { field: "app_id" });
        }
        if self.login_type.is_empty() {
            return Err(ConfigError::MissingField { field: "login_type" });
        }
        self.partner_url()?;
        if let Some(host) = &self.redemption_host {
            RedemptionRequest::new(host.as_str(), "", self.app_id.as_str()).url()?;
        }
        Ok(())
    }

    pub fn partner_url(&self) -> Result<Url, ConfigError> {
        Ok(parse_url(&self.partner_url)?)
    }

    pub fn callback_engine(&self) -> SignatureEngine {
        SignatureEngine::new(self.callback_strategy.clone(), self.encoding)
    }

    pub fn launch_engine(&self) -> SignatureEngine {
        SignatureEngine::new(self.launch_strategy.clone(), self.encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndauth_codec::{ArrayEncoding, BoolEncoding};
    use ndauth_crypto::FixedFields;

    fn reference_json() -> serde_json::Value {
        serde_json::json!({
            "app_id": "aq20200807",
            "partner_url": "nd.aqcenter://oncetoken/auth",
            "callback_strategy": {
                "kind": "fixed_fields",
                "fields": ["errCode", "onceCode", "timestamp", "type"]
            },
            "launch_strategy": {
                "kind": "fixed_fields",
                "fields": ["appId", "appSign", "timestamp"]
            },
            "redemption_host": "auth.example.com"
        })
    }

    #[test]
    fn parses_reference_profile() {
        let profile = PartnerProfile::from_json(&reference_json().to_string()).unwrap();
        assert_eq!(profile.app_id, "aq20200807");
        assert_eq!(profile.login_type, LOGIN_TYPE);
        assert_eq!(
            profile.callback_strategy,
            SignatureStrategy::FixedFields(FixedFields::callback())
        );
        assert_eq!(
            profile.launch_strategy,
            SignatureStrategy::FixedFields(FixedFields::launch())
        );
        assert_eq!(profile.encoding, EncoderOptions::default());
        assert_eq!(profile.redemption_host.as_deref(), Some("auth.example.com"));
    }

    #[test]
    fn parses_explicit_encoding_and_canonical_strategy() {
        let mut json = reference_json();
        json["callback_strategy"] = serde_json::json!({ "kind": "canonical" });
        json["encoding"] = serde_json::json!({
            "array_encoding": "no_brackets",
            "bool_encoding": "literal"
        });
        let profile = PartnerProfile::from_json(&json.to_string()).unwrap();
        assert_eq!(profile.callback_strategy, SignatureStrategy::Canonical);
        assert_eq!(profile.encoding.array_encoding, ArrayEncoding::NoBrackets);
        assert_eq!(profile.encoding.bool_encoding, BoolEncoding::Literal);
    }

    #[test]
    fn rejects_missing_strategy() {
        let mut json = reference_json();
        json.as_object_mut().unwrap().remove("callback_strategy");
        let err = PartnerProfile::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("callback_strategy"));
    }

    #[test]
    fn rejects_empty_app_id() {
        let mut json = reference_json();
        json["app_id"] = serde_json::json!("");
        let err = PartnerProfile::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("missing app_id"));
    }

    #[test]
    fn rejects_unparsable_partner_url() {
        let mut json = reference_json();
        json["partner_url"] = serde_json::json!("oncetoken/auth");
        let err = PartnerProfile::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("oncetoken/auth"));
    }

    #[test]
    fn rejects_redemption_host_with_path() {
        let mut json = reference_json();
        json["redemption_host"] = serde_json::json!("evil.example/x?");
        let err = PartnerProfile::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRedemptionHost { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = PartnerProfile::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn builder_matches_json() {
        let built = PartnerProfile::new(
            "aq20200807",
            "nd.aqcenter://oncetoken/auth",
            SignatureStrategy::FixedFields(FixedFields::callback()),
            SignatureStrategy::FixedFields(FixedFields::launch()),
        )
        .with_redemption_host("auth.example.com");
        let parsed = PartnerProfile::from_json(&reference_json().to_string()).unwrap();
        assert_eq!(built, parsed);
    }
}
