//! Domain entities representing core business objects.

pub mod verification_session;

pub use verification_session::{
    SessionPolicy, SessionState, VerificationSession, CODE_LENGTH, CODE_VALIDITY_SECONDS,
    LOCKOUT_SECONDS, MAX_ATTEMPTS, RESEND_COOLDOWN_SECONDS,
};
