//! Value objects used by the verification controller.

pub mod countdown;
pub mod otp_code;

pub use countdown::format_countdown;
pub use otp_code::{sanitize_input, OtpCode};
