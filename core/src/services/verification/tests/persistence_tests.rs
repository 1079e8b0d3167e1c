//! Tests for timer persistence across controller instances

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::Duration;

use crate::domain::entities::verification_session::SessionState;
use crate::services::verification::{
    ControllerPorts, ManualClock, OtpController, OtpControllerConfig, SessionStore,
};

use super::mocks::{
    t0, FailingStorage, HarnessBuilder, MockIssuanceService, MockNavigator, MockStorage,
    MockVerificationService,
};

const ISSUED_KEY: &str = "otp:code_issued_at:a@b.com";
const COOLDOWN_KEY: &str = "otp:resend_cooldown_until:a@b.com";

fn millis(at: chrono::DateTime<chrono::Utc>) -> String {
    at.timestamp_millis().to_string()
}

#[test]
fn test_key_layout() {
    let store = SessionStore::new(None, "otp:");
    assert_eq!(store.code_issued_at_key("a@b.com"), ISSUED_KEY);
    assert_eq!(store.resend_cooldown_until_key("a@b.com"), COOLDOWN_KEY);
    assert!(!store.is_available());
    assert!(!SessionStore::memory_only().is_available());
}

#[test]
fn test_hydrate_initializes_issue_time() {
    let h = HarnessBuilder::new().build();

    assert_eq!(h.storage.value(ISSUED_KEY), Some(millis(t0())));
    assert!(h.storage.value(COOLDOWN_KEY).is_none());

    let view = h.controller.view();
    assert!(view.hydrated);
    assert_eq!(view.expiry_display, "10:00");
    assert_eq!(view.code_expiry_seconds, 600);
}

#[test]
fn test_hydrate_is_idempotent() {
    let h = HarnessBuilder::new().build();
    h.clock.advance(Duration::seconds(30));

    let view = h.controller.hydrate();

    assert_eq!(view.code_expiry_seconds, 570);
    assert_eq!(h.storage.value(ISSUED_KEY), Some(millis(t0())));
}

#[test]
fn test_reload_resumes_countdown() {
    let storage = Arc::new(MockStorage::default());
    storage.insert(ISSUED_KEY, &millis(t0()));

    let clock = Arc::new(ManualClock::new(t0() + Duration::seconds(120)));
    let h = HarnessBuilder::new()
        .storage(storage)
        .clock(clock)
        .build();

    let view = h.controller.view();
    assert_eq!(view.code_expiry_seconds, 480);
    assert_eq!(view.expiry_display, "08:00");
    assert_eq!(h.storage.value(ISSUED_KEY), Some(millis(t0())));
}

#[test]
fn test_reload_restores_pending_cooldown_only() {
    let storage = Arc::new(MockStorage::default());
    storage.insert(ISSUED_KEY, &millis(t0()));
    storage.insert(COOLDOWN_KEY, &millis(t0() + Duration::seconds(60)));

    let clock = Arc::new(ManualClock::new(t0() + Duration::seconds(45)));
    let h = HarnessBuilder::new()
        .storage(storage.clone())
        .clock(clock)
        .build();
    let view = h.controller.view();
    assert_eq!(view.resend_cooldown_seconds, 15);
    assert!(!view.can_resend);

    let later = Arc::new(ManualClock::new(t0() + Duration::seconds(90)));
    let h = HarnessBuilder::new().storage(storage).clock(later).build();
    let view = h.controller.view();
    assert_eq!(view.resend_cooldown_seconds, 0);
    assert!(view.can_resend);
}

#[test]
fn test_reload_of_stale_code_shows_expired() {
    let storage = Arc::new(MockStorage::default());
    storage.insert(ISSUED_KEY, &millis(t0()));

    let clock = Arc::new(ManualClock::new(t0() + Duration::hours(2)));
    let h = HarnessBuilder::new().storage(storage).clock(clock).build();

    let view = h.controller.view();
    assert_eq!(view.state, SessionState::Expired);
    assert_eq!(view.expiry_display, "00:00");
}

#[test]
fn test_corrupt_value_is_discarded() {
    let storage = Arc::new(MockStorage::default());
    storage.insert(ISSUED_KEY, "not-a-number");
    storage.insert(COOLDOWN_KEY, "");

    let h = HarnessBuilder::new().storage(storage).build();

    assert_eq!(h.storage.value(ISSUED_KEY), Some(millis(t0())));
    assert!(h.storage.value(COOLDOWN_KEY).is_none());
    assert_eq!(h.controller.view().code_expiry_seconds, 600);
}

#[test]
fn test_storage_is_scoped_by_email() {
    let storage = Arc::new(MockStorage::default());
    storage.insert("otp:code_issued_at:other@b.com", &millis(t0() - Duration::minutes(9)));

    let h = HarnessBuilder::new().storage(storage).build();

    assert_eq!(h.controller.view().code_expiry_seconds, 600);
    assert_eq!(h.storage.len(), 2);
}

#[test]
fn test_custom_prefix() {
    let mut config = OtpControllerConfig::default();
    config.storage_key_prefix = "app:".to_string();
    let h = HarnessBuilder::new().config(config).build();

    assert_eq!(h.storage.value("app:code_issued_at:a@b.com"), Some(millis(t0())));
    assert!(h.storage.value(ISSUED_KEY).is_none());
}

#[tokio::test]
async fn test_unavailable_storage_degrades_to_memory() {
    let storage = Arc::new(FailingStorage::default());
    let clock = Arc::new(ManualClock::new(t0()));
    let ports = ControllerPorts::new(
        Arc::new(MockVerificationService::new()),
        Arc::new(MockIssuanceService::new(false)),
        Arc::new(MockNavigator::default()),
    )
    .with_storage(storage.clone())
    .with_clock(clock.clone());
    let controller = OtpController::new("a@b.com", ports, OtpControllerConfig::default()).unwrap();

    let view = controller.hydrate();
    assert!(view.hydrated);
    assert_eq!(view.code_expiry_seconds, 600);

    clock.advance(Duration::seconds(5));
    controller.request_resend().await.unwrap();
    let _ = controller.submit_code("000000").await;
    controller.abandon();

    assert_eq!(storage.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_without_storage_timers_still_run() {
    let clock = Arc::new(ManualClock::new(t0()));
    let ports = ControllerPorts::new(
        Arc::new(MockVerificationService::new()),
        Arc::new(MockIssuanceService::new(false)),
        Arc::new(MockNavigator::default()),
    )
    .with_clock(clock.clone());
    let controller = OtpController::new("a@b.com", ports, OtpControllerConfig::default()).unwrap();
    controller.hydrate();

    clock.advance(Duration::seconds(61));
    assert_eq!(controller.tick().expiry_display, "08:59");
}

#[test]
fn test_unhydrated_view_shows_full_window() {
    let h = HarnessBuilder::new().build_unhydrated();

    let view = h.controller.view();
    assert!(!view.hydrated);
    assert_eq!(view.expiry_display, "10:00");
    assert_eq!(h.storage.len(), 0);
}

#[test]
fn test_unhydrated_view_follows_configured_validity() {
    let mut config = OtpControllerConfig::default();
    config.policy.code_validity_seconds = 300;
    let h = HarnessBuilder::new().config(config).build_unhydrated();

    let view = h.controller.view();
    assert!(!view.hydrated);
    assert_eq!(view.expiry_display, "05:00");
    assert_eq!(view.code_expiry_seconds, 300);

    h.clock.advance(Duration::seconds(90));
    assert_eq!(h.controller.hydrate().expiry_display, "05:00");
}
