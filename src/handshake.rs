//! Inbound callback validation.
//!
//! A callback URL moves through `Received → ParamsDecoded → SignatureChecked`
//! and ends `Accepted` or `Rejected`. Nothing here fails: malformed input
//! decodes to an empty parameter set and is rejected for lacking a signature.

use std::fmt;

use ndauth_codec::{decode, decode_str, ParameterValue, Parameters, Url};
use ndauth_crypto::{SignatureEngine, SIGN_KEY};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PartnerProfile;

pub const TYPE_KEY: &str = "type";
pub const ERR_CODE_KEY: &str = "errCode";
pub const ONCE_CODE_KEY: &str = "onceCode";

// errCode values on a login callback
const CODE_TOKEN_ISSUED: &str = "-1";
const CODE_USER_DENIED: &str = "1100";
const CODE_USER_CANCELLED: &str = "1200";
const CODE_TOKEN_FETCH_FAILED: &str = "1300";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    Received,
    ParamsDecoded,
    SignatureChecked,
    Accepted,
    Rejected,
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::ParamsDecoded => "params_decoded",
            Self::SignatureChecked => "signature_checked",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("Callback carries no signature")]
    MissingSignature,
    #[error("Callback signature does not match its parameters")]
    SignatureMismatch,
}

/// Outcome of a login callback, classified from `errCode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResult {
    /// The partner issued a one-time code. Empty if the callback left
    /// `onceCode` out.
    TokenIssued { once_code: String },
    UserDenied,
    UserCancelled,
    TokenFetchFailed,
    /// Any other code, or none at all.
    UnknownError { err_code: Option<String> },
}

impl LoginResult {
    pub fn classify(err_code: Option<&str>, once_code: Option<&str>) -> Self {
        match err_code {
            Some(CODE_TOKEN_ISSUED) => Self::TokenIssued {
                once_code: once_code.unwrap_or("").to_string(),
            },
            Some(CODE_USER_DENIED) => Self::UserDenied,
            Some(CODE_USER_CANCELLED) => Self::UserCancelled,
            Some(CODE_TOKEN_FETCH_FAILED) => Self::TokenFetchFailed,
            other => Self::UnknownError {
                err_code: other.map(str::to_string),
            },
        }
    }

    /// The one-time code, for `TokenIssued`.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::TokenIssued { once_code } => Some(once_code),
            _ => None,
        }
    }

    /// The wire `errCode` this result was classified from.
    pub fn err_code(&self) -> Option<&str> {
        match self {
            Self::TokenIssued { .. } => Some(CODE_TOKEN_ISSUED),
            Self::UserDenied => Some(CODE_USER_DENIED),
            Self::UserCancelled => Some(CODE_USER_CANCELLED),
            Self::TokenFetchFailed => Some(CODE_TOKEN_FETCH_FAILED),
            Self::UnknownError { err_code } => err_code.as_deref(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::TokenIssued { .. })
    }
}

impl fmt::Display for LoginResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenIssued { .. } => f.write_str("Login token issued"),
            Self::UserDenied => f.write_str("User denied the authorization"),
            Self::UserCancelled => f.write_str("User cancelled the authorization"),
            Self::TokenFetchFailed => f.write_str("Partner failed to fetch a login token"),
            Self::UnknownError { err_code: Some(code) } => write!(f, "Unknown error code {code}"),
            Self::UnknownError { err_code: None } => f.write_str("Unknown error (no code)"),
        }
    }
}

/// A callback whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedHandshake {
    /// Decoded parameters with `sign` removed.
    pub parameters: Parameters,
    /// Set when `type` marks a login callback.
    pub login: Option<LoginResult>,
}

impl AcceptedHandshake {
    pub fn handshake_type(&self) -> Option<&str> {
        self.parameters.get_str(TYPE_KEY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeOutcome {
    Accepted(AcceptedHandshake),
    Rejected(RejectReason),
}

impl HandshakeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn login(&self) -> Option<&LoginResult> {
        match self {
            Self::Accepted(accepted) => accepted.login.as_ref(),
            Self::Rejected(_) => None,
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// Receives classified login results, e.g. to show them to the user.
pub trait HandshakePresenter {
    fn present(&self, result: &LoginResult);
}

impl<F> HandshakePresenter for F
where
    F: Fn(&LoginResult),
{
    fn present(&self, result: &LoginResult) {
        self(result)
    }
}

/// Checks inbound callbacks against one signing strategy.
#[derive(Debug, Clone)]
pub struct HandshakeValidator {
    engine: SignatureEngine,
    login_type: String,
}

impl HandshakeValidator {
    pub fn new(engine: SignatureEngine, login_type: impl Into<String>) -> Self {
        Self {
            engine,
            login_type: login_type.into(),
        }
    }

    /// Validator for callbacks from the partner described by `profile`.
    pub fn from_profile(profile: &PartnerProfile) -> Self {
        Self::new(profile.callback_engine(), profile.login_type.clone())
    }

    pub fn engine(&self) -> &SignatureEngine {
        &self.engine
    }

    /// Validate a callback URL string. Unparsable input is rejected with
    /// [`RejectReason::MissingSignature`].
    pub fn validate(&self, url: &str) -> HandshakeOutcome {
        debug!(stage = %HandshakeStage::Received, "handshake callback");
        self.validate_parameters(decode_str(url))
    }

    pub fn validate_url(&self, url: &Url) -> HandshakeOutcome {
        debug!(stage = %HandshakeStage::Received, scheme = url.scheme(), "handshake callback");
        self.validate_parameters(decode(url))
    }

    /// Validate already-decoded callback parameters.
    pub fn validate_parameters(&self, mut parameters: Parameters) -> HandshakeOutcome {
        debug!(
            stage = %HandshakeStage::ParamsDecoded,
            count = parameters.len(),
            "decoded callback parameters"
        );

        let provided = match parameters.remove(SIGN_KEY) {
            Some(ParameterValue::String(sign)) => sign,
            _ => return reject(RejectReason::MissingSignature, 0),
        };

        let verified = self.engine.verify_signature(&parameters, &provided);
        debug!(stage = %HandshakeStage::SignatureChecked, verified, "checked callback signature");
        if !verified {
            return reject(RejectReason::SignatureMismatch, provided.len());
        }

        let login = (parameters.get_str(TYPE_KEY) == Some(self.login_type.as_str())).then(|| {
            LoginResult::classify(
                parameters.get_str(ERR_CODE_KEY),
                parameters.get_str(ONCE_CODE_KEY),
            )
        });
        debug!(
            stage = %HandshakeStage::Accepted,
            login = login.is_some(),
            err_code = ?login.as_ref().and_then(LoginResult::err_code),
            "accepted callback"
        );
        HandshakeOutcome::Accepted(AcceptedHandshake { parameters, login })
    }

    /// Validate `url` and hand any login result to `presenter`.
    ///
    /// Returns `true` iff the callback was accepted. The presenter is only
    /// called for accepted login callbacks.
    pub fn handle(&self, url: &str, presenter: &dyn HandshakePresenter) -> bool {
        let outcome = self.validate(url);
        if let Some(login) = outcome.login() {
            presenter.present(login);
        }
        outcome.is_accepted()
    }
}

fn reject(reason: RejectReason, signature_len: usize) -> HandshakeOutcome {
    warn!(
        stage = %HandshakeStage::Rejected,
        %reason,
        signature_len,
        "rejected callback"
    );
    HandshakeOutcome::Rejected(reason)
}
