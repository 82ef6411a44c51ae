// Propatch — Settings Patcher
// Reads the single `settings` row, validates `additional.proStatus` against
// the legal states and rewrites it to `pro`. Nothing is written unless every
// check has passed; the UPDATE at the end is the only mutation.

use crate::atoms::constants::{
    ADDITIONAL_FIELD, NULL_MARKER, PRO_STATUS_FIELD, PRO_STATUS_PATH, SELECT_SETTINGS_SQL,
    SETTINGS_KEY, SUCCESS_MESSAGE, UPDATE_SETTINGS_SQL,
};
use crate::atoms::error::{PatchError, PatchResult};
use crate::atoms::traits::{Notifier, StoreLocator};
use crate::atoms::types::{ConfigRow, PatchOutcome, ProStatus};
use crate::engine::store::Store;
use log::{info, warn};
use rusqlite::params;
use serde_json::Value;
use std::path::Path;

pub struct SettingsPatcher<N: Notifier> {
    notifier: N,
}

impl<N: Notifier> SettingsPatcher<N> {
    pub fn new(notifier: N) -> Self {
        SettingsPatcher { notifier }
    }

    /// Locate, open, patch, and tell the operator how it went.
    pub fn run(&self, locator: &dyn StoreLocator) -> PatchResult<PatchOutcome> {
        let result = locator.locate().and_then(|path| self.patch_file(&path));
        match &result {
            Ok(outcome) => {
                info!("[patcher] proStatus {} -> {}", outcome.previous, outcome.current);
                self.notifier.success(SUCCESS_MESSAGE);
            }
            Err(e) => self.notifier.error(&e.operator_message()),
        }
        result
    }

    /// Open the store at `path` and patch it. The connection is closed
    /// before this returns, whatever the outcome.
    pub fn patch_file(&self, path: &Path) -> PatchResult<PatchOutcome> {
        let store = Store::open(path)?;
        self.apply(&store)
    }

    /// Validate and transition `proStatus` in an already-open store.
    pub fn apply(&self, store: &Store) -> PatchResult<PatchOutcome> {
        let row = fetch_settings_row(store)?;
        let mut document = parse_document(&row.value)?;
        let previous = read_pro_status(&document)?;
        let current = previous.transition();

        set_pro_status(&mut document, current)?;
        let serialized = serde_json::to_string(&document)?;

        store.execute(UPDATE_SETTINGS_SQL, params![serialized, row.key])?;
        Ok(PatchOutcome { previous, current })
    }

    /// Read-only: report the stored state without writing.
    pub fn inspect(&self, store: &Store) -> PatchResult<ProStatus> {
        let row = fetch_settings_row(store)?;
        let document = parse_document(&row.value)?;
        read_pro_status(&document)
    }
}

fn fetch_settings_row(store: &Store) -> PatchResult<ConfigRow> {
    let rows = store.select(SELECT_SETTINGS_SQL, params![SETTINGS_KEY])?;
    match rows.as_slice() {
        [row] if row.len() == 1 => Ok(ConfigRow {
            key: SETTINGS_KEY.to_string(),
            value: row[0].clone(),
        }),
        _ => Err(PatchError::MalformedResultSet {
            rows: rows.len(),
            columns: rows.first().map_or(0, Vec::len),
        }),
    }
}

fn parse_document(raw: &str) -> PatchResult<Value> {
    if raw == NULL_MARKER {
        // SQL NULL and the literal text "NULL" land here alike.
        warn!("[patcher] settings value is {:?}; treating it as malformed JSON", NULL_MARKER);
    }
    Ok(serde_json::from_str(raw)?)
}

fn read_pro_status(document: &Value) -> PatchResult<ProStatus> {
    let additional = document
        .get(ADDITIONAL_FIELD)
        .filter(|v| v.is_object())
        .ok_or_else(|| PatchError::MissingField(ADDITIONAL_FIELD.to_string()))?;
    let raw = additional
        .get(PRO_STATUS_FIELD)
        .ok_or_else(|| PatchError::MissingField(PRO_STATUS_PATH.to_string()))?;
    let raw = raw.as_str().ok_or_else(|| {
        PatchError::MalformedJson(format!("{} is not a string: {}", PRO_STATUS_PATH, raw))
    })?;
    raw.parse()
}

fn set_pro_status(document: &mut Value, status: ProStatus) -> PatchResult<()> {
    let slot = document
        .get_mut(ADDITIONAL_FIELD)
        .and_then(|additional| additional.get_mut(PRO_STATUS_FIELD))
        .ok_or_else(|| PatchError::MissingField(PRO_STATUS_PATH.to_string()))?;
    *slot = serde_json::to_value(status)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use serde_json::json;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<(bool, String)>>,
    }

    impl Notifier for Recorder {
        fn success(&self, message: &str) {
            self.events.borrow_mut().push((true, message.to_string()));
        }
        fn error(&self, message: &str) {
            self.events.borrow_mut().push((false, message.to_string()));
        }
    }

    struct Fixed(PathBuf);

    impl StoreLocator for Fixed {
        fn locate(&self) -> PatchResult<PathBuf> {
            Ok(self.0.clone())
        }
    }

    struct Cancelled;

    impl StoreLocator for Cancelled {
        fn locate(&self) -> PatchResult<PathBuf> {
            Err(PatchError::NoStoreSelected)
        }
    }

    fn db_with(dir: &TempDir, values: &[Option<&str>]) -> PathBuf {
        let path = dir.path().join("data-app.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE settings (key TEXT, value TEXT);").unwrap();
        for value in values {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES ('settings', ?1)",
                params![value],
            )
            .unwrap();
        }
        path
    }

    fn stored_values(path: &Path) -> Vec<Option<String>> {
        let conn = Connection::open(path).unwrap();
        let mut stmt = conn
            .prepare("SELECT value FROM settings WHERE key = 'settings' ORDER BY rowid")
            .unwrap();
        let values = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        values
    }

    /// Seed raw bytes, either as TEXT (via CAST) or as a BLOB.
    fn db_with_bytes(dir: &TempDir, bytes: &[u8], as_text: bool) -> PathBuf {
        let path = db_with(dir, &[]);
        let sql = if as_text {
            "INSERT INTO settings (key, value) VALUES ('settings', CAST(?1 AS TEXT))"
        } else {
            "INSERT INTO settings (key, value) VALUES ('settings', ?1)"
        };
        Connection::open(&path).unwrap().execute(sql, params![bytes]).unwrap();
        path
    }

    /// Stored bytes and storage class of the settings value.
    fn stored_raw(path: &Path) -> (Vec<u8>, String) {
        Connection::open(path)
            .unwrap()
            .query_row(
                "SELECT CAST(value AS BLOB), typeof(value) FROM settings WHERE key = 'settings'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap()
    }

    fn stored_json(path: &Path) -> Value {
        let raw = stored_values(path).remove(0).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    fn patcher() -> SettingsPatcher<Recorder> {
        SettingsPatcher::new(Recorder::default())
    }

    #[test]
    fn free_becomes_pro_and_siblings_survive() {
        let dir = TempDir::new().unwrap();
        let path = db_with(&dir, &[Some(r#"{"additional":{"proStatus":"free","other":1}}"#)]);

        let outcome = patcher().patch_file(&path).unwrap();
        assert_eq!(outcome, PatchOutcome { previous: ProStatus::Free, current: ProStatus::Pro });
        assert_eq!(stored_json(&path), json!({"additional":{"proStatus":"pro","other":1}}));
    }

    #[test]
    fn test_state_becomes_pro_with_nested_content_untouched() {
        let dir = TempDir::new().unwrap();
        let original = json!({
            "version": "9.2",
            "blocks": [{"name": "Social", "enabled": true}],
            "additional": {"proStatus": "test", "theme": {"dark": false}, "ratio": 0.5},
        });
        let path = db_with(&dir, &[Some(original.to_string().as_str())]);

        patcher().patch_file(&path).unwrap();

        let mut expected = original.clone();
        expected["additional"]["proStatus"] = json!("pro");
        assert_eq!(stored_json(&path), expected);
    }

    #[test]
    fn pro_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let original = json!({"additional":{"proStatus":"pro"},"x":[1,2,3]});
        let path = db_with(&dir, &[Some(original.to_string().as_str())]);

        let outcome = patcher().patch_file(&path).unwrap();
        assert!(!outcome.changed());
        assert_eq!(stored_json(&path), original);

        patcher().patch_file(&path).unwrap();
        assert_eq!(stored_json(&path), original);
    }

    #[test]
    fn unknown_state_is_rejected_without_write() {
        let dir = TempDir::new().unwrap();
        let raw = r#"{"additional":{"proStatus":"cracked"}}"#;
        let path = db_with(&dir, &[Some(raw)]);

        match patcher().patch_file(&path) {
            Err(PatchError::InvalidState(v)) => assert_eq!(v, "cracked"),
            other => panic!("expected InvalidState, got {:?}", other),
        }
        assert_eq!(stored_values(&path), vec![Some(raw.to_string())]);
    }

    #[test]
    fn missing_row_is_malformed_result_set() {
        let dir = TempDir::new().unwrap();
        let path = db_with(&dir, &[]);
        match patcher().patch_file(&path) {
            Err(PatchError::MalformedResultSet { rows, .. }) => assert_eq!(rows, 0),
            other => panic!("expected MalformedResultSet, got {:?}", other),
        }
    }

    #[test]
    fn duplicated_row_is_malformed_result_set_without_write() {
        let dir = TempDir::new().unwrap();
        let raw = r#"{"additional":{"proStatus":"free"}}"#;
        let path = db_with(&dir, &[Some(raw), Some(raw)]);

        match patcher().patch_file(&path) {
            Err(PatchError::MalformedResultSet { rows, columns }) => {
                assert_eq!((rows, columns), (2, 1));
            }
            other => panic!("expected MalformedResultSet, got {:?}", other),
        }
        assert_eq!(stored_values(&path), vec![Some(raw.to_string()), Some(raw.to_string())]);
    }

    #[test]
    fn unparseable_value_is_malformed_json_without_write() {
        let dir = TempDir::new().unwrap();
        let raw = "{not json";
        let path = db_with(&dir, &[Some(raw)]);

        assert!(matches!(patcher().patch_file(&path), Err(PatchError::MalformedJson(_))));
        assert_eq!(stored_values(&path), vec![Some(raw.to_string())]);
    }

    #[test]
    fn sql_null_folds_into_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = db_with(&dir, &[None]);

        assert!(matches!(patcher().patch_file(&path), Err(PatchError::MalformedJson(_))));
        assert_eq!(stored_values(&path), vec![None]);
    }

    #[test]
    fn missing_fields_are_reported_by_path() {
        let cases = [
            (r#"{"other":true}"#, "additional"),
            (r#"{"additional":"flat"}"#, "additional"),
            (r#"[1,2,3]"#, "additional"),
            (r#"{"additional":{}}"#, "additional.proStatus"),
        ];
        for (raw, field) in cases {
            let dir = TempDir::new().unwrap();
            let path = db_with(&dir, &[Some(raw)]);
            match patcher().patch_file(&path) {
                Err(PatchError::MissingField(f)) => assert_eq!(f, field, "for {raw}"),
                other => panic!("expected MissingField for {raw}, got {:?}", other),
            }
            assert_eq!(stored_values(&path), vec![Some(raw.to_string())]);
        }
    }

    #[test]
    fn non_string_status_is_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = db_with(&dir, &[Some(r#"{"additional":{"proStatus":3}}"#)]);
        assert!(matches!(patcher().patch_file(&path), Err(PatchError::MalformedJson(_))));
    }

    #[test]
    fn embedded_quotes_survive_the_write() {
        let dir = TempDir::new().unwrap();
        let path = db_with(
            &dir,
            &[Some(r#"{"additional":{"proStatus":"free","note":"it's 'quoted'"}}"#)],
        );

        patcher().patch_file(&path).unwrap();
        assert_eq!(
            stored_json(&path),
            json!({"additional":{"proStatus":"pro","note":"it's 'quoted'"}})
        );
    }

    #[test]
    fn rewrite_keeps_field_order() {
        let dir = TempDir::new().unwrap();
        let path = db_with(&dir, &[Some(r#"{"z":1,"additional":{"proStatus":"free","b":2,"a":3},"a":0}"#)]);

        patcher().patch_file(&path).unwrap();
        assert_eq!(
            stored_values(&path),
            vec![Some(r#"{"z":1,"additional":{"proStatus":"pro","b":2,"a":3},"a":0}"#.to_string())]
        );
    }

    const INVALID_UTF8: &[u8] = b"{\"additional\":{\"proStatus\":\"free\",\"name\":\"\xFF\xFE\"}}";

    #[test]
    fn invalid_utf8_text_aborts_without_write() {
        let dir = TempDir::new().unwrap();
        let path = db_with_bytes(&dir, INVALID_UTF8, true);

        assert!(matches!(patcher().patch_file(&path), Err(PatchError::MalformedJson(_))));
        assert_eq!(stored_raw(&path), (INVALID_UTF8.to_vec(), "text".to_string()));
    }

    #[test]
    fn invalid_utf8_blob_aborts_without_write() {
        let dir = TempDir::new().unwrap();
        let path = db_with_bytes(&dir, INVALID_UTF8, false);

        assert!(matches!(patcher().patch_file(&path), Err(PatchError::MalformedJson(_))));
        assert_eq!(stored_raw(&path), (INVALID_UTF8.to_vec(), "blob".to_string()));
    }

    #[test]
    fn utf8_blob_is_patched_and_stored_as_text() {
        let dir = TempDir::new().unwrap();
        let raw = r#"{"additional":{"proStatus":"test","name":"Zoë"}}"#;
        let path = db_with_bytes(&dir, raw.as_bytes(), false);

        patcher().patch_file(&path).unwrap();
        assert_eq!(stored_json(&path), json!({"additional":{"proStatus":"pro","name":"Zoë"}}));
    }

    #[test]
    fn numbers_are_rewritten_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = db_with(
            &dir,
            &[Some(r#"{"id":123456789012345678901234567890,"ratio":1.50,"additional":{"proStatus":"free"}}"#)],
        );

        patcher().patch_file(&path).unwrap();
        assert_eq!(
            stored_values(&path),
            vec![Some(
                r#"{"id":123456789012345678901234567890,"ratio":1.50,"additional":{"proStatus":"pro"}}"#
                    .to_string()
            )]
        );
    }

    #[test]
    fn inspect_reads_without_writing() {
        let dir = TempDir::new().unwrap();
        let raw = r#"{"additional":{"proStatus":"test"}}"#;
        let path = db_with(&dir, &[Some(raw)]);

        let store = Store::open(&path).unwrap();
        assert_eq!(patcher().inspect(&store).unwrap(), ProStatus::Test);
        drop(store);
        assert_eq!(stored_values(&path), vec![Some(raw.to_string())]);
    }

    #[test]
    fn run_notifies_success() {
        let dir = TempDir::new().unwrap();
        let path = db_with(&dir, &[Some(r#"{"additional":{"proStatus":"free"}}"#)]);
        let recorder = Recorder::default();

        SettingsPatcher::new(&recorder).run(&Fixed(path)).unwrap();
        assert_eq!(*recorder.events.borrow(), vec![(true, SUCCESS_MESSAGE.to_string())]);
    }

    #[test]
    fn run_notifies_each_failure_once() {
        let dir = TempDir::new().unwrap();
        let path = db_with(&dir, &[Some(r#"{"additional":{"proStatus":"cracked"}}"#)]);
        let recorder = Recorder::default();
        let patcher = SettingsPatcher::new(&recorder);

        assert!(patcher.run(&Fixed(path)).is_err());
        assert!(matches!(patcher.run(&Cancelled), Err(PatchError::NoStoreSelected)));

        let events = recorder.events.borrow();
        assert_eq!(events.len(), 2);
        assert!(!events[0].0 && events[0].1.contains("cracked"));
        assert_eq!(events[1], (false, "No database file selected.".to_string()));
    }
}
