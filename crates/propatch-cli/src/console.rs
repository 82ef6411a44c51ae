// Console notifier — the operator-facing output channel of the CLI.
// Success goes to stdout, errors to stderr; both are mirrored to the log.

use propatch::Notifier;

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        log::info!("[cli] {}", message);
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        log::error!("[cli] {}", message);
        eprintln!("Error: {}", message);
    }
}
