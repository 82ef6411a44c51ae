// ── Propatch Atoms: Constants ──────────────────────────────────────────────
// All named constants for the crate live here.

// ── Settings row ──────────────────────────────────────────────────────────
// Cold Turkey Blocker keeps its whole configuration as one JSON blob in
// `settings(key, value)` under this key.
pub const SETTINGS_KEY: &str = "settings";

pub(crate) const SELECT_SETTINGS_SQL: &str = "SELECT value FROM settings WHERE key = ?1";
pub(crate) const UPDATE_SETTINGS_SQL: &str = "UPDATE settings SET value = ?1 WHERE key = ?2";

// ── Document path ─────────────────────────────────────────────────────────
pub const ADDITIONAL_FIELD: &str = "additional";
pub const PRO_STATUS_FIELD: &str = "proStatus";
pub const PRO_STATUS_PATH: &str = "additional.proStatus";

// ── Text coercion ─────────────────────────────────────────────────────────
// SQL NULL columns come back from `Store::select` as this literal. A real
// NULL and the text "NULL" are indistinguishable to callers.
pub const NULL_MARKER: &str = "NULL";

// ── Store discovery ───────────────────────────────────────────────────────
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) const PROGRAM_DATA_ENV: &str = "ProgramData";
pub(crate) const PROGRAM_DATA_FALLBACK: &str = r"C:\ProgramData";
pub(crate) const VENDOR_DIR: &str = "Cold Turkey";
pub(crate) const STORE_FILE_NAME: &str = "data-app.db";
pub const PICKER_TITLE: &str = "Select Database File";

// ── Operator messages ─────────────────────────────────────────────────────
pub const SUCCESS_MESSAGE: &str = "Database modification successful.";
pub(crate) const RUN_ORIGIN_HINT: &str = "Try starting Cold Turkey Blocker at least one time.";
