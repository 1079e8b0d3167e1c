//! One-second countdown ticker

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::controller::OtpController;
use super::traits::{IssuanceServiceTrait, VerificationServiceTrait};

/// Period of the countdown ticker
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns the ticker task; the task is aborted when the handle is dropped
#[derive(Debug)]
pub struct TickerHandle {
    handle: JoinHandle<()>,
}

impl TickerHandle {
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl<V, I> OtpController<V, I>
where
    V: VerificationServiceTrait + 'static,
    I: IssuanceServiceTrait + 'static,
{
    /// Start calling [`tick`](OtpController::tick) once per second
    ///
    /// The task only holds a weak reference and exits once the controller is
    /// dropped or unmounted. Starting a new ticker replaces the previous one.
    pub fn spawn_ticker(self: &Arc<Self>) {
        let controller = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                if !controller.is_mounted() {
                    break;
                }
                controller.tick();
            }
        });
        self.install_ticker(TickerHandle { handle });
    }
}
