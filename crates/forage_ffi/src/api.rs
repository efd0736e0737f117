//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose forageable commands, snapshot reads and the wheel spin to Dart.
//! - Turn core errors into stable envelope responses.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every DB-backed call opens its own migrated connection.
//! - The reward session lives for the process and is never persisted.
//! - `name` and `location_address` are trimmed before they reach the core;
//!   every other text field is stored exactly as sent.

use forage_core::db::open_db;
use forage_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    is_valid_entry as is_valid_entry_inner, ping as ping_inner, Forageable, ForageableInput,
    ForageableService, NavigationSignal, SqliteForageableStore, WheelSpin, DEFAULT_PROGRESS_MAX,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const FORAGE_DB_FILE_NAME: &str = "forage.sqlite3";
const FORAGE_DB_PATH_ENV: &str = "FORAGE_DB_PATH";
static FORAGE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static REWARD_SESSION: OnceLock<Mutex<WheelSpin>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Forageable record as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForageableItem {
    pub id: i64,
    pub name: String,
    pub location_address: String,
    pub notes: String,
    pub in_season: bool,
    pub remind_text: String,
}

impl From<Forageable> for ForageableItem {
    fn from(value: Forageable) -> Self {
        Self {
            id: value.id,
            name: value.name,
            location_address: value.location_address,
            notes: value.notes,
            in_season: value.in_season,
            remind_text: value.remind_text,
        }
    }
}

/// Envelope for add/update/delete commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForageableActionResponse {
    pub ok: bool,
    /// Affected record id on success.
    pub id: Option<i64>,
    pub message: String,
}

impl ForageableActionResponse {
    fn success(message: impl Into<String>, id: i64) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Envelope for single-record reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForageableGetResponse {
    pub ok: bool,
    pub item: Option<ForageableItem>,
    pub message: String,
}

/// Envelope for listing reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForageableListResponse {
    pub ok: bool,
    pub items: Vec<ForageableItem>,
    pub message: String,
}

/// Envelope for wheel-spin and progress calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardResponse {
    /// `false` while the spin cooldown is active.
    pub ok: bool,
    pub gained: u32,
    pub total: u32,
    /// `"<total>/<max>"` for the progress bar.
    pub label: String,
    pub message: String,
}

/// Required-field gate for the add/edit form.
#[flutter_rust_bridge::frb(sync)]
pub fn forageable_is_valid_entry(name: String, location_address: String) -> bool {
    is_valid_entry_inner(name.as_str(), location_address.as_str())
}

/// Creates a forageable.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - `name` and `location_address` are stored trimmed.
/// - Returns the assigned id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn forageable_add(
    name: String,
    location_address: String,
    notes: String,
    in_season: bool,
    remind_text: String,
) -> ForageableActionResponse {
    let input = to_input(name, location_address, notes, in_season, remind_text);
    match with_service(|service| service.add_forageable(&input).map_err(|err| err.to_string())) {
        Ok(id) => ForageableActionResponse::success("Forageable saved.", id),
        Err(err) => ForageableActionResponse::failure(format!("forageable_add failed: {err}")),
    }
}

/// Replaces every field of forageable `id`.
///
/// Required fields are trimmed the same way as in `forageable_add`.
#[flutter_rust_bridge::frb(sync)]
pub fn forageable_update(
    id: i64,
    name: String,
    location_address: String,
    notes: String,
    in_season: bool,
    remind_text: String,
) -> ForageableActionResponse {
    let input = to_input(name, location_address, notes, in_season, remind_text);
    match with_service(|service| {
        service
            .update_forageable(id, &input)
            .map(|record| record.id)
            .map_err(|err| err.to_string())
    }) {
        Ok(id) => ForageableActionResponse::success("Forageable updated.", id),
        Err(err) => ForageableActionResponse::failure(format!("forageable_update failed: {err}")),
    }
}

/// Deletes forageable `id`; an unknown id is reported as not found.
#[flutter_rust_bridge::frb(sync)]
pub fn forageable_delete(id: i64) -> ForageableActionResponse {
    match with_service(|service| service.delete_by_id(id).map_err(|err| err.to_string())) {
        Ok(()) => ForageableActionResponse::success("Forageable deleted.", id),
        Err(err) => ForageableActionResponse::failure(format!("forageable_delete failed: {err}")),
    }
}

/// Reads one forageable; `item=None` with `ok=true` when it does not exist.
#[flutter_rust_bridge::frb(sync)]
pub fn forageable_get(id: i64) -> ForageableGetResponse {
    match with_service(|service| service.get_forageable(id).map_err(|err| err.to_string())) {
        Ok(record) => ForageableGetResponse {
            ok: true,
            message: if record.is_some() {
                "Found.".to_string()
            } else {
                "Not found.".to_string()
            },
            item: record.map(ForageableItem::from),
        },
        Err(err) => ForageableGetResponse {
            ok: false,
            item: None,
            message: format!("forageable_get failed: {err}"),
        },
    }
}

/// Reads every forageable in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn forageable_list() -> ForageableListResponse {
    match with_service(|service| service.list_forageables().map_err(|err| err.to_string())) {
        Ok(records) => ForageableListResponse {
            ok: true,
            message: format!("{} forageable(s).", records.len()),
            items: records.into_iter().map(ForageableItem::from).collect(),
        },
        Err(err) => ForageableListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("forageable_list failed: {err}"),
        },
    }
}

/// Map lookup URI for a location address.
#[flutter_rust_bridge::frb(sync)]
pub fn forageable_map_query(location_address: String) -> String {
    forage_core::map_query(location_address.as_str())
}

/// Spins the wheel for the process-wide reward session.
///
/// # FFI contract
/// - `ok=false` while the cooldown is active; the total is unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn reward_spin() -> RewardResponse {
    with_reward_session(|wheel| {
        let progress = |wheel: &WheelSpin| wheel.counter().progress(DEFAULT_PROGRESS_MAX);
        match wheel.spin() {
            Some(NavigationSignal::SpinCompleted { gained, total }) => RewardResponse {
                ok: true,
                gained,
                total,
                label: progress(wheel).label,
                message: format!("Gained {gained} exp."),
            },
            _ => {
                let current = progress(wheel);
                RewardResponse {
                    ok: false,
                    gained: 0,
                    total: current.current,
                    label: current.label,
                    message: "Spin is cooling down.".to_string(),
                }
            }
        }
    })
}

/// Current reward total without spinning.
#[flutter_rust_bridge::frb(sync)]
pub fn reward_current() -> u32 {
    with_reward_session(|wheel| wheel.counter().current())
}

/// Progress bar data against `max` (`None` uses the default capacity).
#[flutter_rust_bridge::frb(sync)]
pub fn reward_progress(max: Option<u32>) -> RewardResponse {
    with_reward_session(|wheel| {
        let progress = wheel
            .counter()
            .progress(max.unwrap_or(DEFAULT_PROGRESS_MAX));
        RewardResponse {
            ok: true,
            gained: 0,
            total: progress.current,
            label: progress.label,
            message: String::new(),
        }
    })
}

/// Builds the core input; form padding on required fields is dropped here.
fn to_input(
    name: String,
    location_address: String,
    notes: String,
    in_season: bool,
    remind_text: String,
) -> ForageableInput {
    ForageableInput {
        name: name.trim().to_string(),
        location_address: location_address.trim().to_string(),
        notes,
        in_season,
        remind_text,
    }
}

fn resolve_db_path() -> PathBuf {
    FORAGE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(FORAGE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(FORAGE_DB_FILE_NAME)
        })
        .clone()
}

fn open_connection() -> Result<Connection, String> {
    open_db(resolve_db_path()).map_err(|err| {
        warn!("event=ffi_db_open module=ffi status=error error={err}");
        format!("DB open failed: {err}")
    })
}

fn with_service<T>(
    f: impl FnOnce(&ForageableService<SqliteForageableStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_connection()?;
    let store = SqliteForageableStore::try_new(&conn)
        .map_err(|err| format!("store init failed: {err}"))?;
    let service =
        ForageableService::new(store).map_err(|err| format!("service init failed: {err}"))?;
    f(&service)
}

fn with_reward_session<T>(f: impl FnOnce(&mut WheelSpin) -> T) -> T {
    let session = REWARD_SESSION.get_or_init(|| Mutex::new(WheelSpin::default()));
    let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut *guard)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, forageable_add, forageable_delete, forageable_get, forageable_is_valid_entry,
        forageable_list, forageable_map_query, forageable_update, init_logging, ping,
        reward_current, reward_progress, reward_spin,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/forage-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn is_valid_entry_matches_core_gate() {
        assert!(forageable_is_valid_entry("Morel".into(), "Forest Rd".into()));
        assert!(!forageable_is_valid_entry(" ".into(), "Forest Rd".into()));
    }

    #[test]
    fn add_get_update_delete_roundtrip() {
        let name = unique_token("morel");
        let created = forageable_add(
            name.clone(),
            "123 Forest Rd".into(),
            "near the creek".into(),
            true,
            "check weekly".into(),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.id.expect("add returns id");

        let fetched = forageable_get(id);
        assert!(fetched.ok, "{}", fetched.message);
        let item = fetched.item.expect("record exists");
        assert_eq!(item.name, name);
        assert!(item.in_season);

        let updated = forageable_update(
            id,
            name.clone(),
            "123 Forest Rd".into(),
            "near the creek".into(),
            false,
            "check weekly".into(),
        );
        assert!(updated.ok, "{}", updated.message);
        assert!(!forageable_get(id).item.expect("still exists").in_season);
        assert!(forageable_list().items.iter().any(|item| item.id == id));

        let deleted = forageable_delete(id);
        assert!(deleted.ok, "{}", deleted.message);
        assert!(forageable_get(id).item.is_none());

        let again = forageable_delete(id);
        assert!(!again.ok);
        assert!(again.message.contains("not found"));
    }

    #[test]
    fn add_trims_required_fields_only() {
        let name = unique_token("chanterelle");
        let created = forageable_add(
            format!("  {name}\t"),
            " 9 Oak Ln ".into(),
            "  under the oaks ".into(),
            false,
            " after rain ".into(),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.id.expect("add returns id");

        let item = forageable_get(id).item.expect("record exists");
        assert_eq!(item.name, name);
        assert_eq!(item.location_address, "9 Oak Ln");
        assert_eq!(item.notes, "  under the oaks ");
        assert_eq!(item.remind_text, " after rain ");

        assert!(forageable_delete(id).ok);
    }

    #[test]
    fn add_rejects_blank_required_fields() {
        let response = forageable_add(
            "Morel".into(),
            "   ".into(),
            String::new(),
            false,
            String::new(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("location_address"));
    }

    #[test]
    fn map_query_is_exposed() {
        assert_eq!(
            forageable_map_query("5 Elm St., Salem".into()),
            "geo:0,0?q=5+Elm+St.,Salem"
        );
    }

    #[test]
    fn reward_spin_then_cooldown() {
        let before = reward_current();
        let first = reward_spin();
        assert!(first.ok, "{}", first.message);
        assert!((1..=5).contains(&first.gained));
        assert_eq!(first.total, before + first.gained);

        let second = reward_spin();
        assert!(!second.ok);
        assert_eq!(second.total, first.total);
        assert_eq!(reward_progress(Some(50)).label, format!("{}/50", first.total));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
