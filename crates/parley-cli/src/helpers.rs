//! Shared CLI helpers: response printing, version banner, status marks.

use colored::Colorize;

/// Print one assistant message to stdout.
pub fn print_response(text: &str) {
    println!();
    println!("{}", "Parley".cyan().bold());
    if text.is_empty() {
        println!("{}", "(empty message)".dimmed());
    } else {
        println!("{text}");
    }
    println!();
}

/// Print the banner shown at REPL and gateway start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Parley".cyan().bold(), version.dimmed());
    println!("{}", "Type a message, or \"exit\" to quit.".dimmed());
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "… thinking".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// `✓` / `✗` marker for status lines.
pub fn mark(ok: bool) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_symbols() {
        assert!(mark(true).contains('✓'));
        assert!(mark(false).contains('✗'));
    }
}
