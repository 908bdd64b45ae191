//! Explicit per-session context.
//!
//! Replaces ambient globals with one struct per logged-in session: who is
//! logged in, the chosen language, the cached uploads and the artifacts of
//! the last generation run. Sessions are keyed by a UUID bearer token and
//! expire after 15 idle minutes; touching any authenticated endpoint
//! refreshes the clock.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::generate::models::{LogEntry, Progress};
use crate::i18n::Lang;
use crate::table::{ColumnSelection, DataTable};

pub const SESSION_TIMEOUT_MINUTES: i64 = 15;

/// An uploaded file kept verbatim (the letter template).
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// An uploaded table, already parsed.
#[derive(Debug, Clone)]
pub struct UploadedTable {
    pub filename: String,
    pub table: DataTable,
}

/// Everything one interactive session owns. Nothing here is persisted.
#[derive(Debug)]
pub struct SessionContext {
    pub username: String,
    pub lang: Lang,
    pub last_active: DateTime<Utc>,
    pub template: Option<UploadedFile>,
    pub table: Option<UploadedTable>,
    pub selection: Option<ColumnSelection>,
    /// Table uploaded on the analysis page, independent of the generator's.
    pub analysis_table: Option<UploadedTable>,
    pub generate_log: Vec<LogEntry>,
    pub archive: Option<Vec<u8>>,
    pub progress: Option<Progress>,
    pub last_data_rows: usize,
}

impl SessionContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            lang: Lang::default(),
            last_active: Utc::now(),
            template: None,
            table: None,
            selection: None,
            analysis_table: None,
            generate_log: Vec::new(),
            archive: None,
            progress: None,
            last_data_rows: 0,
        }
    }

    /// Drop all cached work while keeping the login and language choice.
    pub fn reset_workspace(&mut self) {
        self.template = None;
        self.table = None;
        self.selection = None;
        self.analysis_table = None;
        self.generate_log.clear();
        self.archive = None;
        self.progress = None;
        self.last_data_rows = 0;
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.last_active > Duration::minutes(SESSION_TIMEOUT_MINUTES)
    }
}

/// Token-keyed session store. An expired session behaves exactly like a
/// missing one and is removed on first contact.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionContext>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, username: &str) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions
            .write()
            .insert(token, SessionContext::new(username));
        token
    }

    /// Run `f` against the live session behind `token`, refreshing its idle
    /// clock. Returns `None` for unknown or expired tokens.
    pub fn with_session<R>(&self, token: Uuid, f: impl FnOnce(&mut SessionContext) -> R) -> Option<R> {
        let mut sessions = self.sessions.write();
        let expired = match sessions.get(&token) {
            Some(session) => session.is_expired(Utc::now()),
            None => return None,
        };
        if expired {
            sessions.remove(&token);
            return None;
        }
        let session = sessions.get_mut(&token)?;
        session.touch();
        Some(f(session))
    }

    pub fn remove(&self, token: Uuid) -> bool {
        self.sessions.write().remove(&token).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
