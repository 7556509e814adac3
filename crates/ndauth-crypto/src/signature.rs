//! Signature construction and verification over parameter sets.
//!
//! Two payload strategies exist in the wild and they do not produce the same
//! signature for the same parameters, so each partner integration has to
//! name the one it speaks:
//!
//! - [`SignatureStrategy::FixedFields`]: `key=value` slots for a fixed,
//!   ordered list of fields, whatever else is present.
//! - [`SignatureStrategy::Canonical`]: the canonical query string over every
//!   field except `sign`, keys lower-cased.
//!
//! The payload is then base64-encoded and the base64 text is MD5-hashed.
//! There is no secret: anyone who knows the field list can produce a valid
//! signature. The check only proves both sides agree on the algorithm.

use std::fmt;

use ndauth_codec::{escape, join, EncoderOptions, KeyCase, ParameterValue, Parameters, QueryEncoder};
use serde::{Deserialize, Serialize};

use crate::digest::{constant_time_eq, sign_payload};

/// Parameter that carries the signature. Never part of the signed payload.
pub const SIGN_KEY: &str = "sign";

/// Length of a signature token in hex characters.
pub const SIGNATURE_LEN: usize = 32;

/// Fixed, ordered field list for [`SignatureStrategy::FixedFields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFields {
    pub fields: Vec<String>,
}

impl FixedFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Fields signed on the callback from the partner app.
    pub fn callback() -> Self {
        Self::new(["errCode", "onceCode", "timestamp", "type"])
    }

    /// Fields signed on the launch request to the partner app.
    pub fn launch() -> Self {
        Self::new(["appId", "appSign", "timestamp"])
    }
}

/// How the signing payload is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignatureStrategy {
    FixedFields(FixedFields),
    Canonical,
}

impl fmt::Display for SignatureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedFields(fixed) => write!(f, "fixed_fields({})", fixed.fields.join(",")),
            Self::Canonical => write!(f, "canonical"),
        }
    }
}

/// Builds and checks signatures with one strategy.
#[derive(Debug, Clone)]
pub struct SignatureEngine {
    strategy: SignatureStrategy,
    encoder: QueryEncoder,
}

impl SignatureEngine {
    pub fn new(strategy: SignatureStrategy, options: EncoderOptions) -> Self {
        Self {
            strategy,
            encoder: QueryEncoder::new(options),
        }
    }

    pub fn strategy(&self) -> &SignatureStrategy {
        &self.strategy
    }

    /// The exact string that gets base64-encoded and hashed.
    ///
    /// `sign` is never included. Under `FixedFields`, a listed field that is
    /// missing still occupies its slot as `key=` so both sides hash the same
    /// shape; present values are escaped like canonical query values.
    pub fn signing_payload(&self, parameters: &Parameters) -> String {
        match &self.strategy {
            SignatureStrategy::FixedFields(fixed) => fixed
                .fields
                .iter()
                .filter(|field| field.as_str() != SIGN_KEY)
                .map(|field| self.fixed_slot(field, parameters.get(field)))
                .collect::<Vec<_>>()
                .join("&"),
            SignatureStrategy::Canonical => {
                let mut unsigned = parameters.clone();
                unsigned.remove(SIGN_KEY);
                join(&self.encoder.canonical_components(&unsigned, KeyCase::Lower))
            }
        }
    }

    /// 32-char lowercase hex signature for `parameters` (`sign` excluded).
    pub fn build_signature(&self, parameters: &Parameters) -> String {
        let payload = self.signing_payload(parameters);
        tracing::trace!(
            strategy = %self.strategy,
            payload_len = payload.len(),
            "built signing payload"
        );
        sign_payload(&payload)
    }

    /// Recompute the signature and compare it with `provided` in constant
    /// time. Comparison is exact and case-sensitive.
    pub fn verify_signature(&self, parameters: &Parameters, provided: &str) -> bool {
        constant_time_eq(&self.build_signature(parameters), provided)
    }

    /// Copy of `parameters` with `sign` set to its signature.
    pub fn sign(&self, parameters: &Parameters) -> Parameters {
        let signature = self.build_signature(parameters);
        let mut signed = parameters.clone();
        signed.insert(SIGN_KEY, signature);
        signed
    }

    fn fixed_slot(&self, field: &str, value: Option<&ParameterValue>) -> String {
        let Some(value) = value else {
            return format!("{field}=");
        };
        match self.encoder.render_scalar(value) {
            Some(rendered) => format!("{field}={}", escape(&rendered)),
            None => {
                let nested = join(&self.encoder.flatten(field, value));
                if nested.is_empty() {
                    format!("{field}=")
                } else {
                    nested
                }
            }
        }
    }
}
