// propatch — validate and flip Cold Turkey Blocker's `additional.proStatus`
//
// Layout:
//   atoms/   — constants, data types, collaborator traits, error enum (no I/O)
//   engine/  — SQLite access, the patch itself, store discovery, notifiers

pub mod atoms;
pub mod engine;

pub use atoms::error::{PatchError, PatchResult};
pub use atoms::traits::{Notifier, PathPrompt, StoreLocator};
pub use atoms::types::{ConfigRow, PatchOutcome, ProStatus, Rows};
pub use engine::locator::{
    default_store_path, DefaultStoreLocator, FixedPathLocator, LocatorConfig, TerminalPrompt,
};
pub use engine::notifier::LogNotifier;
pub use engine::patcher::SettingsPatcher;
pub use engine::store::Store;
