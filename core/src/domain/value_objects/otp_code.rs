//! Validated six-digit verification code.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::domain::entities::verification_session::CODE_LENGTH;
use crate::errors::VerificationError;

static OTP_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").unwrap());

/// A code matching `^[0-9]{6}$`
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Parses a candidate code, rejecting anything but exactly six ASCII digits
    pub fn parse(candidate: &str) -> Result<Self, VerificationError> {
        if OTP_CODE_REGEX.is_match(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(VerificationError::InvalidFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are credentials; keep them out of debug output.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

/// Normalises raw keystrokes or pasted text into a code candidate
pub fn sanitize_input(raw: &str) -> String {
    cg_shared::validation::digits_only(raw, CODE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_six_digits() {
        let code = OtpCode::parse("012345").unwrap();
        assert_eq!(code.as_str(), "012345");
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for candidate in ["", "12345", "1234567", "12345a", " 123456", "123456\n", "12 456", "１２３４５６", "٠١٢٣٤٥"] {
            assert_eq!(OtpCode::parse(candidate), Err(VerificationError::InvalidFormat), "{:?}", candidate);
        }
    }

    #[test]
    fn test_debug_hides_digits() {
        let code = OtpCode::parse("987654").unwrap();
        assert!(!format!("{:?}", code).contains("987654"));
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("12-34 56"), "123456");
        assert_eq!(sanitize_input("1234567"), "123456");
        assert_eq!(sanitize_input("a1"), "1");
    }
}
