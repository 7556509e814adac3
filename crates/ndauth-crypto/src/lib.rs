//! Signature primitives for the ndauth handshake.
//!
//! - `hex(md5(base64(payload)))` signature tokens
//! - Fixed-field and canonical payload strategies
//! - Constant-time signature comparison

pub mod digest;
pub mod signature;

pub use digest::{base64_encode, constant_time_eq, md5_hex, sign_payload};
pub use signature::{FixedFields, SignatureEngine, SignatureStrategy, SIGNATURE_LEN, SIGN_KEY};
