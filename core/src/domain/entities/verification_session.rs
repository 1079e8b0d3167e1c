//! Verification session entity for the email OTP sign-in flow.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of digits in a verification code
pub const CODE_LENGTH: usize = 6;

/// Failed attempts allowed before the session is locked
pub const MAX_ATTEMPTS: u32 = 5;

/// Validity window of an issued code (10 minutes)
pub const CODE_VALIDITY_SECONDS: i64 = 600;

/// Lockout duration after reaching `MAX_ATTEMPTS` (5 minutes)
pub const LOCKOUT_SECONDS: i64 = 300;

/// Minimum time between two resend requests
pub const RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Policy numbers a session is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    pub max_attempts: u32,
    pub code_validity_seconds: i64,
    pub lockout_seconds: i64,
    pub resend_cooldown_seconds: i64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            code_validity_seconds: CODE_VALIDITY_SECONDS,
            lockout_seconds: LOCKOUT_SECONDS,
            resend_cooldown_seconds: RESEND_COOLDOWN_SECONDS,
        }
    }
}

/// Externally visible state of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Code issued, not expired, not locked
    Active,
    /// Too many failed attempts; verification blocked until the lockout elapses
    Locked,
    /// The code's validity window has passed; a resend is required
    Expired,
    /// The service accepted the code; terminal
    Verified,
}

/// Verification session for one email address
///
/// All countdowns are derived from absolute timestamps so that they stay
/// correct across reloads and suspended hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSession {
    /// Email the code was sent to; partition key for persisted timers
    pub email: String,

    /// When the current code was issued; `None` until hydrated
    pub code_issued_at: Option<DateTime<Utc>>,

    /// Failed verification attempts since the last reset
    pub attempt_count: u32,

    /// Verification is blocked while `now < lockout_until`
    pub lockout_until: Option<DateTime<Utc>>,

    /// Resend is blocked while `now < resend_cooldown_until`
    pub resend_cooldown_until: Option<DateTime<Utc>>,

    /// Code currently typed by the user; never persisted
    #[serde(skip)]
    pub otp_input: String,

    /// Set once the service accepted a code
    pub verified: bool,

    /// Policy this session is evaluated against
    pub policy: SessionPolicy,
}

impl VerificationSession {
    /// Creates an unhydrated session for `email`
    pub fn new(email: impl Into<String>, policy: SessionPolicy) -> Self {
        Self {
            email: email.into(),
            code_issued_at: None,
            attempt_count: 0,
            lockout_until: None,
            resend_cooldown_until: None,
            otp_input: String::new(),
            verified: false,
            policy,
        }
    }

    /// Seconds until the current code expires, in `[0, code_validity_seconds]`
    ///
    /// Computed as `validity - floor(elapsed)`; an unhydrated session reports
    /// the full window.
    pub fn code_expiry_seconds(&self, now: DateTime<Utc>) -> i64 {
        let validity = self.policy.code_validity_seconds;
        match self.code_issued_at {
            Some(issued_at) => {
                let elapsed = (now - issued_at).num_milliseconds().div_euclid(1000);
                (validity - elapsed).clamp(0, validity)
            }
            None => validity,
        }
    }

    /// Whether the current code can no longer be submitted
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.code_expiry_seconds(now) <= 0
    }

    /// Whether a lockout is in force at `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lockout_until, Some(until) if now < until)
    }

    /// Whole seconds left on the lockout, rounded up
    pub fn lockout_remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.lockout_until.map_or(0, |until| remaining_seconds(until, now))
    }

    /// Whole seconds left on the resend cooldown, rounded up
    pub fn resend_cooldown_remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.resend_cooldown_until
            .map_or(0, |until| remaining_seconds(until, now))
    }

    /// Whether a resend may be requested at `now`
    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        !self.verified && self.resend_cooldown_remaining_seconds(now) == 0
    }

    /// Attempts left before the session locks
    pub fn attempts_remaining(&self) -> u32 {
        self.policy.max_attempts.saturating_sub(self.attempt_count)
    }

    /// Records a rejected code
    ///
    /// Returns `true` when this failure exhausted the attempt budget and the
    /// session is now locked until `now + lockout_seconds`.
    pub fn record_failed_attempt(&mut self, now: DateTime<Utc>) -> bool {
        self.attempt_count = (self.attempt_count + 1).min(self.policy.max_attempts);
        self.otp_input.clear();

        if self.attempt_count >= self.policy.max_attempts {
            self.lockout_until = Some(offset(now, self.policy.lockout_seconds));
            true
        } else {
            false
        }
    }

    /// Lifts a lockout whose deadline has passed, resetting the attempt count
    ///
    /// Returns `true` if a lockout was cleared.
    pub fn clear_elapsed_lockout(&mut self, now: DateTime<Utc>) -> bool {
        match self.lockout_until {
            Some(until) if now >= until => {
                self.lockout_until = None;
                self.attempt_count = 0;
                true
            }
            _ => false,
        }
    }

    /// Starts over with a freshly issued code
    pub fn reset_for_new_code(&mut self, now: DateTime<Utc>) {
        self.code_issued_at = Some(now);
        self.resend_cooldown_until = Some(offset(now, self.policy.resend_cooldown_seconds));
        self.attempt_count = 0;
        self.lockout_until = None;
        self.otp_input.clear();
    }

    /// Current state; `Verified` wins over `Locked`, which wins over `Expired`
    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        if self.verified {
            SessionState::Verified
        } else if self.is_locked(now) {
            SessionState::Locked
        } else if self.is_expired(now) {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }
}

/// `now + seconds`, saturating at the latest representable instant
fn offset(now: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    Duration::try_seconds(seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn remaining_seconds(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (until - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + 999) / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn hydrated_session() -> VerificationSession {
        let mut session = VerificationSession::new("a@b.com", SessionPolicy::default());
        session.code_issued_at = Some(t0());
        session
    }

    #[test]
    fn test_unhydrated_session_reports_full_window() {
        let session = VerificationSession::new("a@b.com", SessionPolicy::default());
        assert_eq!(session.code_expiry_seconds(t0()), CODE_VALIDITY_SECONDS);
        assert_eq!(session.state(t0()), SessionState::Active);
    }

    #[test]
    fn test_expiry_counts_down_from_issue_time() {
        let session = hydrated_session();
        assert_eq!(session.code_expiry_seconds(t0()), 600);
        assert_eq!(session.code_expiry_seconds(t0() + Duration::seconds(120)), 480);
        assert_eq!(session.code_expiry_seconds(t0() + Duration::milliseconds(1_999)), 599);
        assert_eq!(session.code_expiry_seconds(t0() + Duration::seconds(599)), 1);
        assert_eq!(session.code_expiry_seconds(t0() + Duration::seconds(600)), 0);
        assert_eq!(session.code_expiry_seconds(t0() + Duration::hours(3)), 0);
        assert!(session.is_expired(t0() + Duration::seconds(600)));
        assert_eq!(session.state(t0() + Duration::seconds(600)), SessionState::Expired);
    }

    #[test]
    fn test_expiry_is_non_increasing() {
        let session = hydrated_session();
        let mut previous = i64::MAX;
        for ms in (0..=620_000).step_by(250) {
            let current = session.code_expiry_seconds(t0() + Duration::milliseconds(ms));
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_expiry_clamped_when_issue_time_is_in_the_future() {
        let session = hydrated_session();
        assert_eq!(session.code_expiry_seconds(t0() - Duration::seconds(30)), 600);
    }

    #[test]
    fn test_fifth_failure_locks() {
        let mut session = hydrated_session();
        for i in 1..MAX_ATTEMPTS {
            assert!(!session.record_failed_attempt(t0()));
            assert_eq!(session.attempt_count, i);
        }
        assert!(session.record_failed_attempt(t0()));
        assert_eq!(session.attempt_count, MAX_ATTEMPTS);
        assert_eq!(session.lockout_until, Some(t0() + Duration::seconds(LOCKOUT_SECONDS)));
        assert_eq!(session.attempts_remaining(), 0);
        assert_eq!(session.state(t0()), SessionState::Locked);
        assert_eq!(session.lockout_remaining_seconds(t0() + Duration::milliseconds(500)), 300);
    }

    #[test]
    fn test_failed_attempt_clears_input() {
        let mut session = hydrated_session();
        session.otp_input = "000000".to_string();
        session.record_failed_attempt(t0());
        assert!(session.otp_input.is_empty());
    }

    #[test]
    fn test_clear_elapsed_lockout() {
        let mut session = hydrated_session();
        for _ in 0..MAX_ATTEMPTS {
            session.record_failed_attempt(t0());
        }

        assert!(!session.clear_elapsed_lockout(t0() + Duration::seconds(299)));
        assert!(session.is_locked(t0() + Duration::seconds(299)));

        assert!(session.clear_elapsed_lockout(t0() + Duration::seconds(300)));
        assert_eq!(session.attempt_count, 0);
        assert!(session.lockout_until.is_none());
        assert!(!session.clear_elapsed_lockout(t0() + Duration::seconds(301)));
    }

    #[test]
    fn test_reset_for_new_code() {
        let mut session = hydrated_session();
        for _ in 0..MAX_ATTEMPTS {
            session.record_failed_attempt(t0());
        }
        let later = t0() + Duration::seconds(30);
        session.otp_input = "12".to_string();
        session.reset_for_new_code(later);

        assert_eq!(session.attempt_count, 0);
        assert!(session.lockout_until.is_none());
        assert!(session.otp_input.is_empty());
        assert_eq!(session.code_expiry_seconds(later), 600);
        assert_eq!(session.resend_cooldown_remaining_seconds(later), 60);
        assert!(!session.can_resend(later + Duration::seconds(59)));
        assert!(session.can_resend(later + Duration::seconds(60)));
        assert_eq!(session.state(later), SessionState::Active);
    }

    #[test]
    fn test_oversized_lockout_saturates_instead_of_overflowing() {
        let policy = SessionPolicy {
            lockout_seconds: 100_000_000_000_000,
            resend_cooldown_seconds: i64::MAX,
            ..SessionPolicy::default()
        };
        let mut session = VerificationSession::new("a@b.com", policy);
        session.code_issued_at = Some(t0());

        for _ in 0..MAX_ATTEMPTS {
            session.record_failed_attempt(t0());
        }
        assert_eq!(session.lockout_until, Some(DateTime::<Utc>::MAX_UTC));
        assert_eq!(session.state(t0() + Duration::days(365)), SessionState::Locked);

        session.reset_for_new_code(t0());
        assert_eq!(session.resend_cooldown_until, Some(DateTime::<Utc>::MAX_UTC));
        assert!(!session.can_resend(t0() + Duration::days(365)));
    }

    #[test]
    fn test_verified_wins_over_other_states() {
        let mut session = hydrated_session();
        session.verified = true;
        assert_eq!(session.state(t0() + Duration::hours(1)), SessionState::Verified);
        assert!(!session.can_resend(t0()));
    }

    #[test]
    fn test_otp_input_is_not_serialized() {
        let mut session = hydrated_session();
        session.otp_input = "123".to_string();
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("otp_input"));
        let restored: VerificationSession = serde_json::from_str(&json).unwrap();
        assert!(restored.otp_input.is_empty());
        assert_eq!(restored.code_issued_at, session.code_issued_at);
    }
}
