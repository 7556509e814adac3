//! Signed URL-scheme handshake with a partner authentication app.
//!
//! - [`LaunchRequest`] builds the signed URL that opens the partner app.
//! - [`HandshakeValidator`] checks the signed callback and classifies the
//!   login result.
//! - [`RedemptionRequest`] describes the follow-up call that redeems an
//!   issued one-time code.
//!
//! Query encoding lives in [`ndauth_codec`], signing in [`ndauth_crypto`].

pub mod config;
pub mod error;
pub mod handshake;
pub mod launch;
pub mod redemption;

pub use config::{PartnerProfile, LOGIN_TYPE};
pub use error::ConfigError;
pub use handshake::{
    AcceptedHandshake, HandshakeOutcome, HandshakePresenter, HandshakeStage, HandshakeValidator,
    LoginResult, RejectReason,
};
pub use launch::LaunchRequest;
pub use redemption::{classify_status, RedemptionRequest, RedemptionStatus};

pub use ndauth_codec::{EncoderOptions, ParameterValue, Parameters, Url};
pub use ndauth_crypto::{FixedFields, SignatureEngine, SignatureStrategy};
