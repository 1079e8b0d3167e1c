//! Types for controller results and rendering

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::verification_session::SessionState;

/// Result of a `submit_code` call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service accepted the code and the host was sent to `redirect_url`
    Verified { redirect_url: String },
    /// Another verification was already running; nothing was sent
    InFlight,
    /// The response arrived after the controller was unmounted, or belongs
    /// to a code replaced by a resend; it was dropped without effect
    Discarded,
}

/// Result of a `request_resend` call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOutcome {
    /// A new code was issued
    Sent { next_resend_at: DateTime<Utc> },
    /// The cooldown has not elapsed; nothing was sent
    CoolingDown { remaining_seconds: i64 },
    /// A resend was already running; nothing was sent
    InFlight,
    /// The controller is unmounted or already verified
    Discarded,
}

/// Everything a host needs to render the verification screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerView {
    pub state: SessionState,
    /// Whether persisted timers have been read
    pub hydrated: bool,
    /// `MM:SS` expiry countdown; the full configured window until hydrated
    pub expiry_display: String,
    pub code_expiry_seconds: i64,
    pub lockout_remaining_seconds: i64,
    pub resend_cooldown_seconds: i64,
    pub can_resend: bool,
    /// Present once at least one attempt has failed
    pub attempts_remaining: Option<u32>,
    pub error_message: Option<String>,
    pub is_verifying: bool,
    pub otp_input: String,
}
