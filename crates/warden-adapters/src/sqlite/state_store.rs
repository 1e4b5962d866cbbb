use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, Transaction};

use warden_core::{
    FocusStats, RuleId, StateStore, StateStoreError, TimerPhase, TimerSession,
};

const KEY_BLOCKED_SITES: &str = "blocked_sites";
const KEY_RULE_IDS: &str = "rule_ids";
const KEY_TIMER_STATE: &str = "timer_state";
const KEY_PAUSED_FROM: &str = "paused_from";
const KEY_CURRENT_TIME: &str = "current_time";
const KEY_TOTAL_TIME: &str = "total_time";
const KEY_BREAK_TIME: &str = "break_time";
const KEY_FOCUS_STATS: &str = "focus_stats";
const KEY_FOCUS_MODE: &str = "focus_mode_active";

/// Key-value state store over a single SQLite table.
///
/// Every key is an independent row; the timer session's dependent keys are
/// written inside one transaction so a crash cannot leave the phase and the
/// countdown disagreeing.
pub struct SqliteStateStore {
    connection: Mutex<Connection>,
}

impl SqliteStateStore {
    pub fn new(path: &Path) -> Result<Self, StateStoreError> {
        let connection = Connection::open(path).map_err(storage_error)?;

        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;

        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StateStoreError> {
        let connection = Connection::open_in_memory().map_err(storage_error)?;

        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;

        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StateStoreError> {
        let connection = self.connection.lock().unwrap();
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS state (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(storage_error)
    }

    fn read_key(&self, key: &str) -> Result<Option<String>, StateStoreError> {
        let connection = self.connection.lock().unwrap();
        let result = connection.query_row(
            "SELECT value FROM state WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(storage_error(error)),
        }
    }

    fn write_key(&self, key: &str, value: &str) -> Result<(), StateStoreError> {
        let connection = self.connection.lock().unwrap();
        upsert(&connection, key, value)
    }
}

fn upsert(connection: &Connection, key: &str, value: &str) -> Result<(), StateStoreError> {
    connection
        .execute(
            "INSERT INTO state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map(|_| ())
        .map_err(storage_error)
}

fn upsert_tx(tx: &Transaction<'_>, key: &str, value: &str) -> Result<(), StateStoreError> {
    tx.execute(
        "INSERT INTO state (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map(|_| ())
    .map_err(storage_error)
}

fn storage_error(error: impl ToString) -> StateStoreError {
    StateStoreError::Storage {
        message: error.to_string(),
    }
}

fn parse_seconds(value: &str) -> Result<u64, StateStoreError> {
    value.parse::<u64>().map_err(storage_error)
}

impl StateStore for SqliteStateStore {
    fn load_blocked_sites(&self) -> Result<BTreeSet<String>, StateStoreError> {
        match self.read_key(KEY_BLOCKED_SITES)? {
            Some(raw) => serde_json::from_str(&raw).map_err(storage_error),
            None => Ok(BTreeSet::new()),
        }
    }

    fn save_blocked_sites(&self, sites: &BTreeSet<String>) -> Result<(), StateStoreError> {
        let raw = serde_json::to_string(sites).map_err(storage_error)?;
        self.write_key(KEY_BLOCKED_SITES, &raw)
    }

    fn load_rule_ids(&self) -> Result<HashMap<String, RuleId>, StateStoreError> {
        match self.read_key(KEY_RULE_IDS)? {
            Some(raw) => serde_json::from_str(&raw).map_err(storage_error),
            None => Ok(HashMap::new()),
        }
    }

    fn save_rule_ids(&self, rule_ids: &HashMap<String, RuleId>) -> Result<(), StateStoreError> {
        let raw = serde_json::to_string(rule_ids).map_err(storage_error)?;
        self.write_key(KEY_RULE_IDS, &raw)
    }

    fn load_session(&self) -> Result<Option<TimerSession>, StateStoreError> {
        let Some(phase_raw) = self.read_key(KEY_TIMER_STATE)? else {
            return Ok(None);
        };

        let phase = TimerPhase::from_stored(&phase_raw);
        let current = match self.read_key(KEY_CURRENT_TIME)? {
            Some(raw) => parse_seconds(&raw)?,
            None => 0,
        };
        let total = match self.read_key(KEY_TOTAL_TIME)? {
            Some(raw) => parse_seconds(&raw)?,
            None => 0,
        };
        let break_seconds = match self.read_key(KEY_BREAK_TIME)? {
            Some(raw) => parse_seconds(&raw)?,
            None => 0,
        };
        let paused_from = self
            .read_key(KEY_PAUSED_FROM)?
            .filter(|raw| !raw.is_empty())
            .map(|raw| TimerPhase::from_stored(&raw));

        Ok(Some(TimerSession::restore(
            phase,
            current,
            total,
            break_seconds,
            paused_from,
        )))
    }

    fn save_session(&self, session: &TimerSession) -> Result<(), StateStoreError> {
        let mut connection = self.connection.lock().unwrap();
        let tx = connection.transaction().map_err(storage_error)?;

        upsert_tx(&tx, KEY_TIMER_STATE, session.phase.as_str())?;
        upsert_tx(&tx, KEY_CURRENT_TIME, &session.current_seconds.to_string())?;
        upsert_tx(&tx, KEY_TOTAL_TIME, &session.total_seconds.to_string())?;
        upsert_tx(&tx, KEY_BREAK_TIME, &session.break_seconds.to_string())?;
        let paused_from = session.paused_from().map(|p| p.as_str()).unwrap_or("");
        upsert_tx(&tx, KEY_PAUSED_FROM, paused_from)?;

        tx.commit().map_err(storage_error)
    }

    fn load_stats(&self) -> Result<FocusStats, StateStoreError> {
        match self.read_key(KEY_FOCUS_STATS)? {
            Some(raw) => serde_json::from_str(&raw).map_err(storage_error),
            None => Ok(FocusStats::new()),
        }
    }

    fn save_stats(&self, stats: &FocusStats) -> Result<(), StateStoreError> {
        let raw = serde_json::to_string(stats).map_err(storage_error)?;
        self.write_key(KEY_FOCUS_STATS, &raw)
    }

    fn load_focus_mode(&self) -> Result<bool, StateStoreError> {
        Ok(self
            .read_key(KEY_FOCUS_MODE)?
            .map(|raw| raw == "true")
            .unwrap_or(false))
    }

    fn save_focus_mode(&self, active: bool) -> Result<(), StateStoreError> {
        self.write_key(KEY_FOCUS_MODE, if active { "true" } else { "false" })
    }
}
