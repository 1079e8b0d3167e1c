//! OTP verification controller
//!
//! Gates the "verify code" action behind format, lockout and expiry checks,
//! delegates verification and re-issuance to external services, and keeps the
//! expiry, lockout and resend countdowns in step with the wall clock.
//!
//! State lives behind one mutex that is never held across an `.await`: the
//! submit path marks itself in flight, releases the lock for the network call
//! and re-acquires it to apply the outcome. A resend applies all of its
//! mutations inside a single critical section, so a tick never observes a
//! half-reset session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use cg_shared::validation::{is_valid_email, mask_email, normalize_email};

use super::callback::build_callback_url;
use super::clock::{Clock, SystemClock};
use super::config::OtpControllerConfig;
use super::persistence::SessionStore;
use super::ticker::TickerHandle;
use super::traits::{
    DurableStorage, IssuanceServiceTrait, Navigator, VerificationServiceTrait, VerifyOutcome,
};
use super::types::{ControllerView, ResendOutcome, SubmitOutcome};
use crate::domain::entities::verification_session::{VerificationSession, CODE_LENGTH};
use crate::domain::value_objects::{format_countdown, sanitize_input, OtpCode};
use crate::errors::{ControllerError, VerificationError};

/// Collaborators injected into the controller
pub struct ControllerPorts<V, I> {
    pub verification: Arc<V>,
    pub issuance: Arc<I>,
    pub navigator: Arc<dyn Navigator>,
    pub storage: Option<Arc<dyn DurableStorage>>,
    pub clock: Arc<dyn Clock>,
}

impl<V, I> ControllerPorts<V, I> {
    /// Ports with no durable storage and the system clock
    pub fn new(verification: Arc<V>, issuance: Arc<I>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            verification,
            issuance,
            navigator,
            storage: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn DurableStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

struct ControllerState {
    session: VerificationSession,
    hydrated: bool,
    mounted: bool,
    verifying: bool,
    resending: bool,
    /// Bumped by every successful resend; a verification answer for an
    /// older generation no longer applies
    generation: u64,
    error_message: Option<String>,
}

/// Client-side OTP verification state machine for one email
pub struct OtpController<V: VerificationServiceTrait, I: IssuanceServiceTrait> {
    email: String,
    verification_service: Arc<V>,
    issuance_service: Arc<I>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    store: SessionStore,
    config: OtpControllerConfig,
    state: Mutex<ControllerState>,
    ticker: Mutex<Option<TickerHandle>>,
}

impl<V: VerificationServiceTrait, I: IssuanceServiceTrait> OtpController<V, I> {
    /// Create a controller for `email`
    ///
    /// The controller starts unhydrated; call [`hydrate`](Self::hydrate) once
    /// the host is interactive.
    pub fn new(
        email: &str,
        ports: ControllerPorts<V, I>,
        config: OtpControllerConfig,
    ) -> Result<Self, ControllerError> {
        if email.trim().is_empty() {
            return Err(ControllerError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(ControllerError::InvalidEmail {
                email: email.to_string(),
            });
        }
        let email = normalize_email(email);

        let store = SessionStore::new(ports.storage, config.storage_key_prefix.clone());
        let session = VerificationSession::new(email.clone(), config.policy);

        Ok(Self {
            email,
            verification_service: ports.verification,
            issuance_service: ports.issuance,
            navigator: ports.navigator,
            clock: ports.clock,
            store,
            config,
            state: Mutex::new(ControllerState {
                session,
                hydrated: false,
                mounted: true,
                verifying: false,
                resending: false,
                generation: 0,
                error_message: None,
            }),
            ticker: Mutex::new(None),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn config(&self) -> &OtpControllerConfig {
        &self.config
    }

    /// Read persisted timer anchors, initialising the issue time if absent
    ///
    /// Idempotent.
    pub fn hydrate(&self) -> ControllerView {
        let now = self.clock.now();
        let mut state = self.lock_state();

        if !state.hydrated {
            let issued_at = match self.store.load_code_issued_at(&self.email) {
                Some(at) => at,
                None => {
                    self.store.save_code_issued_at(&self.email, now);
                    now
                }
            };
            state.session.code_issued_at = Some(issued_at);
            state.session.resend_cooldown_until = self
                .store
                .load_resend_cooldown_until(&self.email)
                .filter(|until| *until > now);
            state.hydrated = true;

            debug!(
                email = %mask_email(&self.email),
                event = "session_hydrated",
                code_expiry_seconds = state.session.code_expiry_seconds(now),
                persisted = self.store.is_available(),
                "Verification session hydrated"
            );
        }

        self.render(&state, now)
    }

    /// Submit a code for verification
    pub async fn submit_code(&self, code: &str) -> Result<SubmitOutcome, VerificationError> {
        let code = match OtpCode::parse(code) {
            Ok(code) => code,
            Err(e) => {
                self.lock_state().error_message = Some(e.user_message());
                return Err(e);
            }
        };

        let generation = {
            let now = self.clock.now();
            let mut state = self.lock_state();
            if !state.mounted || state.session.verified {
                return Ok(SubmitOutcome::Discarded);
            }

            if state.session.clear_elapsed_lockout(now) {
                info!(email = %mask_email(&self.email), event = "lockout_cleared", "Lockout elapsed");
            }
            if state.session.is_locked(now) {
                let e = VerificationError::Locked {
                    remaining_seconds: state.session.lockout_remaining_seconds(now),
                };
                state.error_message = Some(e.user_message());
                return Err(e);
            }
            if state.session.is_expired(now) {
                let e = VerificationError::Expired;
                state.error_message = Some(e.user_message());
                return Err(e);
            }
            if state.verifying {
                debug!(email = %mask_email(&self.email), event = "otp_submit_skipped", "Verification already in flight");
                return Ok(SubmitOutcome::InFlight);
            }

            state.verifying = true;
            state.generation
        };

        info!(email = %mask_email(&self.email), event = "otp_submit", "Submitting verification code");
        let response = self
            .verification_service
            .verify_code(&self.email, code.as_str())
            .await;

        let now = self.clock.now();
        let mut state = self.lock_state();
        state.verifying = false;

        if !state.mounted {
            debug!(email = %mask_email(&self.email), event = "otp_response_discarded", "Controller unmounted before response");
            return Ok(SubmitOutcome::Discarded);
        }
        if state.generation != generation {
            debug!(email = %mask_email(&self.email), event = "otp_response_stale", "Code was replaced while verifying");
            return Ok(SubmitOutcome::Discarded);
        }

        match response {
            Ok(VerifyOutcome::Accepted) => {
                state.session.verified = true;
                state.session.otp_input.clear();
                state.mounted = false;
                state.error_message = None;
                drop(state);

                self.store.clear(&self.email);
                self.stop_ticker();

                let redirect_url = build_callback_url(&self.config.callback, &code, &self.email);
                info!(email = %mask_email(&self.email), event = "otp_verified", "Verification code accepted");
                self.navigator.navigate(&redirect_url);

                Ok(SubmitOutcome::Verified { redirect_url })
            }
            Ok(VerifyOutcome::Rejected { message }) => {
                let e = self.record_failure(&mut state, now, message);
                Err(e)
            }
            Err(message) => {
                warn!(
                    email = %mask_email(&self.email),
                    error = %message,
                    event = "otp_transport_error",
                    "Verification service unavailable"
                );
                if self.config.count_transport_errors_as_attempts {
                    let e = self.record_failure(&mut state, now, None);
                    if matches!(e, VerificationError::TooManyAttempts { .. }) {
                        return Err(e);
                    }
                } else {
                    state.session.otp_input.clear();
                }
                let e = VerificationError::TransportError { message };
                state.error_message = Some(e.user_message());
                Err(e)
            }
        }
    }

    fn record_failure(
        &self,
        state: &mut ControllerState,
        now: DateTime<Utc>,
        message: Option<String>,
    ) -> VerificationError {
        let locked = state.session.record_failed_attempt(now);
        let e = if locked {
            warn!(
                email = %mask_email(&self.email),
                event = "otp_locked",
                lockout_seconds = self.config.policy.lockout_seconds,
                "Maximum verification attempts reached"
            );
            VerificationError::TooManyAttempts {
                lockout_seconds: self.config.policy.lockout_seconds,
            }
        } else {
            let attempts_remaining = state.session.attempts_remaining();
            warn!(
                email = %mask_email(&self.email),
                event = "otp_rejected",
                attempts_remaining = attempts_remaining,
                "Verification code rejected"
            );
            VerificationError::InvalidCode {
                message: message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Invalid verification code".to_string()),
                attempts_remaining,
            }
        };
        state.error_message = Some(e.user_message());
        e
    }

    /// Ask the issuance service for a new code
    pub async fn request_resend(&self) -> Result<ResendOutcome, VerificationError> {
        {
            let now = self.clock.now();
            let mut state = self.lock_state();
            if !state.mounted || state.session.verified {
                return Ok(ResendOutcome::Discarded);
            }
            let remaining_seconds = state.session.resend_cooldown_remaining_seconds(now);
            if remaining_seconds > 0 {
                return Ok(ResendOutcome::CoolingDown { remaining_seconds });
            }
            if state.resending {
                return Ok(ResendOutcome::InFlight);
            }
            state.resending = true;
        }

        info!(email = %mask_email(&self.email), event = "otp_resend", "Requesting a new verification code");
        let result = self.issuance_service.send_code(&self.email).await;

        let mut state = self.lock_state();
        state.resending = false;
        if !state.mounted {
            return Ok(ResendOutcome::Discarded);
        }

        match result {
            Ok(()) => {
                let now = self.clock.now();
                state.session.reset_for_new_code(now);
                state.hydrated = true;
                state.generation += 1;
                state.error_message = None;

                let next_resend_at = state.session.resend_cooldown_until.unwrap_or(now);
                self.store.save_code_issued_at(&self.email, now);
                self.store.save_resend_cooldown_until(&self.email, next_resend_at);

                Ok(ResendOutcome::Sent { next_resend_at })
            }
            Err(message) => {
                warn!(
                    email = %mask_email(&self.email),
                    error = %message,
                    event = "otp_resend_failed",
                    "Failed to issue a new verification code"
                );
                let e = VerificationError::ResendFailed { message };
                state.error_message = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Input change handler with auto-submit
    ///
    /// Submits exactly when the sanitised value becomes six digits long while
    /// the previous value was shorter, the session is not locked and the code
    /// has not expired. Returns `None` when nothing was submitted.
    pub async fn on_input_change(
        &self,
        raw: &str,
    ) -> Option<Result<SubmitOutcome, VerificationError>> {
        let value = sanitize_input(raw);
        let should_submit = {
            let now = self.clock.now();
            let mut state = self.lock_state();
            if !state.mounted {
                return None;
            }
            let previous_len = state.session.otp_input.len();
            state.session.otp_input = value.clone();

            value.len() == CODE_LENGTH
                && previous_len < CODE_LENGTH
                && !state.session.is_locked(now)
                && !state.session.is_expired(now)
        };

        if should_submit {
            Some(self.submit_code(&value).await)
        } else {
            None
        }
    }

    /// Once-per-second timer body
    ///
    /// Lifts an elapsed lockout and recomputes every countdown from absolute
    /// timestamps.
    pub fn tick(&self) -> ControllerView {
        let now = self.clock.now();
        let mut state = self.lock_state();

        if state.mounted {
            if state.session.clear_elapsed_lockout(now) {
                state.error_message = None;
                info!(email = %mask_email(&self.email), event = "lockout_cleared", "Lockout elapsed");
            }
            if matches!(state.session.resend_cooldown_until, Some(until) if now >= until) {
                state.session.resend_cooldown_until = None;
            }
        }

        self.render(&state, now)
    }

    /// Current render model
    pub fn view(&self) -> ControllerView {
        let now = self.clock.now();
        let state = self.lock_state();
        self.render(&state, now)
    }

    /// Copy of the underlying session
    pub fn snapshot(&self) -> VerificationSession {
        self.lock_state().session.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.lock_state().mounted
    }

    /// Leave the flow ("back to login"): forget persisted timers and unmount
    pub fn abandon(&self) {
        info!(email = %mask_email(&self.email), event = "otp_abandoned", "Leaving verification");
        self.store.clear(&self.email);
        self.unmount();
    }

    /// Stop the ticker; responses arriving afterwards are discarded
    pub fn unmount(&self) {
        self.lock_state().mounted = false;
        self.stop_ticker();
    }

    pub(super) fn install_ticker(&self, handle: TickerHandle) {
        let mut slot = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(handle);
    }

    /// Whether a ticker task is currently installed and running
    pub fn ticker_running(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    fn stop_ticker(&self) {
        let handle = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop();
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, state: &ControllerState, now: DateTime<Utc>) -> ControllerView {
        let session = &state.session;
        let code_expiry_seconds = session.code_expiry_seconds(now);
        let resend_cooldown_seconds = session.resend_cooldown_remaining_seconds(now);

        ControllerView {
            state: session.state(now),
            hydrated: state.hydrated,
            // Before hydration this is the full configured window
            expiry_display: format_countdown(code_expiry_seconds),
            code_expiry_seconds,
            lockout_remaining_seconds: session.lockout_remaining_seconds(now),
            resend_cooldown_seconds,
            can_resend: state.mounted && !state.resending && session.can_resend(now),
            attempts_remaining: (session.attempt_count > 0).then(|| session.attempts_remaining()),
            error_message: state.error_message.clone(),
            is_verifying: state.verifying,
            otp_input: session.otp_input.clone(),
        }
    }
}
