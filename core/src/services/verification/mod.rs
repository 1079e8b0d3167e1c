//! OTP verification controller module
//!
//! This module provides the client-side verification workflow:
//! - Code format, lockout and expiry gates in front of the verification service
//! - Attempt tracking with a temporary lockout
//! - Resend with a cooldown
//! - Timer anchors persisted per email through an injected storage port
//! - A one-second ticker recomputing countdowns from absolute timestamps

mod callback;
mod clock;
mod config;
mod controller;
mod persistence;
mod ticker;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use callback::build_callback_url;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::OtpControllerConfig;
pub use controller::{ControllerPorts, OtpController};
pub use persistence::SessionStore;
pub use ticker::{TickerHandle, TICK_PERIOD};
pub use traits::{
    DurableStorage, IssuanceServiceTrait, Navigator, VerificationServiceTrait, VerifyOutcome,
};
pub use types::{ControllerView, ResendOutcome, SubmitOutcome};
