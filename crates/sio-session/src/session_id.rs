use rand::RngCore;
use std::fmt;
use std::str::FromStr;

/// A 32-character lowercase hex session identifier, drawn from a
/// cryptographically adequate entropy source. Stable for the lifetime of
/// the session it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Draws 16 random bytes from the OS CSPRNG and hex-encodes them.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        SessionId(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returned when a path component claims to be a session id but isn't
/// shaped like one (wrong length, or not lowercase hex).
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("session id must be 32 lowercase hex characters")]
pub struct InvalidSessionId;

impl FromStr for SessionId {
    type Err = InvalidSessionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let is_lowercase_hex = s.len() == 32
            && s.bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if is_lowercase_hex {
            Ok(SessionId(s.to_owned()))
        } else {
            Err(InvalidSessionId)
        }
    }
}
