//! Countdown formatting for the expiry, lockout and resend timers.

/// Formats whole seconds as `MM:SS`; negative values render as `00:00`
pub fn format_countdown(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
