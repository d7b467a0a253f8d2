//! Terminal rendering of credentials

use colored::Colorize;
use mfaman_core::types::Credential;

/// Seconds below which the countdown is highlighted
const WARN_SECONDS: f64 = 5.0;

/// Group a code for reading aloud: "123 456", "1234 5678"
pub fn format_code(code: &str) -> String {
    let len = code.chars().count();
    let group = if len % 3 == 0 { 3 } else { len.div_ceil(2) };

    let mut out = String::with_capacity(len + len / group);
    for (i, c) in code.chars().enumerate() {
        if i > 0 && i % group == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Render the countdown, red once it drops below the warning threshold
pub fn format_countdown(seconds: f64) -> String {
    let text = format!("{:>2}s", seconds.ceil() as u64);
    if seconds < WARN_SECONDS {
        text.red().bold().to_string()
    } else {
        text.green().to_string()
    }
}

/// One line per credential
pub fn render_line(credential: &Credential) -> String {
    match (&credential.code, &credential.error) {
        (Some(code), _) => format!(
            "{:<24} {}  {}",
            credential.title,
            format_code(code.token.expose()).bold(),
            format_countdown(credential.seconds_remaining)
        ),
        (None, Some(reason)) => format!(
            "{:<24} {}",
            credential.title,
            format!("error: {}", reason).red()
        ),
        (None, None) => format!("{:<24} {}", credential.title, "pending".dimmed()),
    }
}

pub fn render(credentials: &[Credential]) -> Vec<String> {
    credentials.iter().map(render_line).collect()
}
