use colored::Colorize;
use scm_git::Listener;

/// Prints progress lines to stderr so stdout stays machine-readable.
pub struct ConsoleListener;

impl Listener for ConsoleListener {
    fn line(&self, message: &str) {
        eprintln!("{} {}", "=>".blue().bold(), message);
    }
}
