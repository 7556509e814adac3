//! What the handshake writes to the log.

use std::io;
use std::sync::{Arc, Mutex};

use ndauth::{HandshakeValidator, PartnerProfile, SignatureStrategy};
use ndauth_crypto::FixedFields;
use tracing::Level;

// ============================================================================
// Helpers
// ============================================================================

const TOKEN: &str = "1111111111111111111";
const SIGNATURE: &str = "daf78c74332d1b3fee6f02f953a38dab";

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer.contents())
}

fn validator() -> HandshakeValidator {
    HandshakeValidator::from_profile(&PartnerProfile::new(
        "aq20200807",
        "nd.aqcenter://oncetoken/auth",
        SignatureStrategy::FixedFields(FixedFields::callback()),
        SignatureStrategy::FixedFields(FixedFields::launch()),
    ))
}

// ============================================================================
// Credentials stay out of the log
// ============================================================================

#[test]
fn accepted_login_logs_code_not_token() {
    let url = format!(
        "aq20200807://oauth?errCode=-1&onceCode={TOKEN}&sign={SIGNATURE}&timestamp=1597045&type=1000"
    );
    let (outcome, log) = capture(|| validator().validate(&url));

    assert_eq!(outcome.login().and_then(|login| login.token()), Some(TOKEN));
    assert!(log.contains("accepted callback"), "log was: {log}");
    assert!(log.contains("err_code=Some(\"-1\")"), "log was: {log}");
    assert!(!log.contains(TOKEN), "token leaked: {log}");
    assert!(!log.contains(SIGNATURE), "signature leaked: {log}");
}

#[test]
fn rejected_callback_logs_signature_length_only() {
    let forged = "0123456789abcdef0123456789abcdef";
    let url = format!("aq20200807://oauth?errCode=-1&onceCode={TOKEN}&sign={forged}&type=1000");
    let (outcome, log) = capture(|| validator().validate(&url));

    assert!(!outcome.is_accepted());
    assert!(log.contains("rejected callback"), "log was: {log}");
    assert!(log.contains("signature_len=32"), "log was: {log}");
    assert!(!log.contains(forged), "signature leaked: {log}");
    assert!(!log.contains(TOKEN), "token leaked: {log}");
}
