// Propatch — Log-backed notifier
// Default `Notifier` for embedders that have no operator UI: outcomes go to
// the `log` facade and nowhere else.

use crate::atoms::traits::Notifier;
use log::{error, info};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("[notify] {}", message);
    }

    fn error(&self, message: &str) {
        error!("[notify] {}", message);
    }
}
