//! Time formatting utilities for diagnostics and reports

const PRECISE_PLACEHOLDER: &str = "--:--.--";
const SHORT_PLACEHOLDER: &str = "--";

fn is_displayable(seconds: f64) -> bool {
    seconds.is_finite() && seconds >= 0.0
}

/// Format with hundredths: `M:SS.ff`, or `H:MM:SS.ff` from one hour up
pub fn precise(seconds: f64) -> String {
    if !is_displayable(seconds) {
        return PRECISE_PLACEHOLDER.to_string();
    }

    let total = seconds as u64;
    let mut hours = total / 3600;
    let mut minutes = (total % 3600) / 60;
    let mut secs = ((seconds % 60.0) * 100.0).round() / 100.0;

    // 59.997 rounds up to 60.00 and must carry
    if secs >= 60.0 {
        secs -= 60.0;
        minutes += 1;
    }
    if minutes >= 60 {
        minutes -= 60;
        hours += 1;
    }

    if hours > 0 {
        format!("{}:{:02}:{:05.2}", hours, minutes, secs)
    } else {
        format!("{}:{:05.2}", minutes, secs)
    }
}

/// Short human-readable form like `1h 2m 3s`, `4m 5s` or `6s`
pub fn short(seconds: f64) -> String {
    if !is_displayable(seconds) {
        return SHORT_PLACEHOLDER.to_string();
    }

    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
