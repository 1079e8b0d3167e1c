//! Plain-text rendering of the controller view

use cg_core::domain::entities::verification_session::SessionState;
use cg_core::services::ControllerView;

/// Render the verification screen as a few status lines
pub fn render(view: &ControllerView) -> String {
    let mut lines = Vec::new();

    let status = match view.state {
        SessionState::Active => format!("Code expires in {}", view.expiry_display),
        SessionState::Expired => "Code expired. Request a new one with `resend`.".to_string(),
        SessionState::Locked => format!(
            "Locked for {} more second(s)",
            view.lockout_remaining_seconds
        ),
        SessionState::Verified => "Verified".to_string(),
    };
    lines.push(status);

    if let Some(remaining) = view.attempts_remaining {
        lines.push(format!("Attempts remaining: {}", remaining));
    }
    if let Some(message) = &view.error_message {
        lines.push(format!("Error: {}", message));
    }
    if view.is_verifying {
        lines.push("Verifying...".to_string());
    }
    lines.push(if view.can_resend {
        "Resend available".to_string()
    } else {
        format!("Resend available in {}s", view.resend_cooldown_seconds)
    });

    lines.join("\n")
}
