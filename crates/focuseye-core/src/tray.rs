//! Tray tooltip text derived from session snapshots.

use crate::session::SessionState;

/// `MM:SS`, with minutes allowed past 59.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One-line summary for the tray tooltip.
pub fn tray_summary(state: &SessionState) -> String {
    let status = if state.is_running { "running" } else { "paused" };
    let sessions = match state.work_count {
        1 => "1 work session".to_string(),
        n => format!("{n} work sessions"),
    };
    format!(
        "{} {} ({status}) · {sessions}",
        state.phase.label(),
        format_clock(state.seconds_remaining)
    )
}
