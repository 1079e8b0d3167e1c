//! Business services containing domain logic and use cases.

pub mod verification;

pub use verification::{
    build_callback_url, Clock, ControllerPorts, ControllerView, DurableStorage,
    IssuanceServiceTrait, ManualClock, Navigator, OtpController, OtpControllerConfig,
    ResendOutcome, SessionStore, SubmitOutcome, SystemClock, TickerHandle,
    VerificationServiceTrait, VerifyOutcome, TICK_PERIOD,
};
