// ── Propatch Atoms: Collaborator Traits ────────────────────────────────────
// Seams for everything outside the read-validate-write core: where the store
// file comes from and how the operator hears about the result.

use std::path::PathBuf;

use super::error::PatchResult;

/// Reports the outcome of a run to a human operator.
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Yields the absolute path of the store to patch.
pub trait StoreLocator {
    fn locate(&self) -> PatchResult<PathBuf>;
}

/// Asks the operator to pick a file. `Ok(None)` means the pick was cancelled.
pub trait PathPrompt {
    fn choose(&self, title: &str) -> PatchResult<Option<PathBuf>>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn success(&self, message: &str) {
        (**self).success(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}
