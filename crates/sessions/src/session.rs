//! Request-scoped session handle.
//!
//! A [`Session`] is built once per request from the id presented in the
//! session cookie.  Clones share the same request state, so the application
//! handler and the debug panel observe and mutate the same data.  Nothing is
//! loaded until [`Session::start`]; nothing is written back until
//! [`Session::commit`].

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use sp_domain::config::SessionsConfig;
use sp_domain::error::Result;
use sp_domain::trace::TraceEvent;

use crate::section::{SectionBag, SectionMeta, SessionSection};
use crate::store::SessionStore;

/// Session settings exposed to consumers such as the debug panel.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub cookie_name: String,
    /// Seconds of inactivity before the store collects a session.
    pub gc_maxlifetime: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        (&SessionsConfig::default()).into()
    }
}

impl From<&SessionsConfig> for SessionOptions {
    fn from(cfg: &SessionsConfig) -> Self {
        Self {
            cookie_name: cfg.cookie_name.clone(),
            gc_maxlifetime: cfg.gc_maxlifetime,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    id: Option<String>,
    started: bool,
    destroyed: bool,
    data: Map<String, Value>,
}

/// Handle to the current request's session.
#[derive(Clone)]
pub struct Session {
    store: Arc<SessionStore>,
    options: Arc<SessionOptions>,
    state: Arc<Mutex<State>>,
}

impl Session {
    /// Build a handle for the id presented by the client, if any.
    ///
    /// Ids that could not have been minted by this store are ignored.
    pub fn new(
        store: Arc<SessionStore>,
        options: Arc<SessionOptions>,
        presented_id: Option<String>,
    ) -> Self {
        let id = presented_id.filter(|id| is_valid_id(id));
        Self {
            store,
            options,
            state: Arc::new(Mutex::new(State {
                id,
                ..State::default()
            })),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Current session id, if one was presented or minted.
    pub fn id(&self) -> Option<String> {
        self.state.lock().id.clone()
    }

    /// Whether the session is started or the client presented a session id.
    pub fn exists(&self) -> bool {
        let state = self.state.lock();
        state.started || state.id.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    /// Whether [`Session::destroy`] ran during this request.
    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Load the session data, minting a fresh id when the presented one is
    /// unknown.  Expired managed sections are dropped on load.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.started {
            return Ok(());
        }

        let loaded = state.id.as_deref().and_then(|id| self.store.load(id));
        let is_new = loaded.is_none();
        let mut data = loaded.unwrap_or_default();
        if is_new {
            state.id = Some(uuid::Uuid::new_v4().to_string());
        }

        let mut bag = SectionBag::read(&data);
        let expired = bag.expire(Utc::now().timestamp());
        if !expired.is_empty() {
            tracing::debug!(sections = ?expired, "dropped expired session sections");
            bag.write(&mut data);
        }

        state.data = data;
        state.started = true;
        state.destroyed = false;

        TraceEvent::SessionStarted {
            session_id: state.id.clone().unwrap_or_default(),
            is_new,
        }
        .emit();
        Ok(())
    }

    /// Start the session only when the client already has one.
    pub fn auto_start(&self) -> Result<()> {
        if self.exists() && !self.is_started() {
            self.start()?;
        }
        Ok(())
    }

    /// Remove the session from the store and forget its id and data.
    pub fn destroy(&self) -> Result<()> {
        let id = {
            let mut state = self.state.lock();
            state.data.clear();
            state.started = false;
            state.destroyed = true;
            state.id.take()
        };
        if let Some(id) = &id {
            self.store.remove(id)?;
        }
        TraceEvent::SessionDestroyed { session_id: id }.emit();
        Ok(())
    }

    /// Write a started session back to the store.
    pub fn commit(&self) -> Result<()> {
        let (id, data) = {
            let state = self.state.lock();
            match (&state.id, state.started) {
                (Some(id), true) => (id.clone(), state.data.clone()),
                _ => return Ok(()),
            }
        };
        let keys = data.len();
        self.store.save(&id, data)?;
        TraceEvent::SessionCommitted {
            session_id: id,
            keys,
        }
        .emit();
        Ok(())
    }

    // ── Raw store ────────────────────────────────────────────────────

    /// Top-level keys of the loaded raw data, including the managed layer's
    /// reserved key.
    pub fn raw_keys(&self) -> Vec<String> {
        self.state.lock().data.keys().cloned().collect()
    }

    pub fn raw_get(&self, key: &str) -> Option<Value> {
        self.state.lock().data.get(key).cloned()
    }

    pub fn raw_set(&self, key: &str, value: Value) -> Result<()> {
        self.start()?;
        self.state.lock().data.insert(key.to_owned(), value);
        Ok(())
    }

    pub fn raw_remove(&self, key: &str) -> Option<Value> {
        self.state.lock().data.remove(key)
    }

    // ── Managed sections ─────────────────────────────────────────────

    /// Names of all managed sections.  Starts an existing session.
    pub fn section_names(&self) -> Result<Vec<String>> {
        self.auto_start()?;
        Ok(self.with_bag(|bag| bag.data.keys().cloned().collect()))
    }

    pub fn section(&self, name: &str) -> SessionSection {
        SessionSection::new(self.clone(), name.to_owned())
    }

    /// Expiration metadata of a managed section, if any was set.
    pub fn section_meta(&self, name: &str) -> Option<SectionMeta> {
        self.with_bag(|bag| bag.meta.get(name).cloned())
    }

    pub(crate) fn with_bag<R>(&self, f: impl FnOnce(&SectionBag) -> R) -> R {
        let state = self.state.lock();
        f(&SectionBag::read(&state.data))
    }

    pub(crate) fn update_bag<R>(&self, f: impl FnOnce(&mut SectionBag) -> R) -> R {
        let mut state = self.state.lock();
        let mut bag = SectionBag::read(&state.data);
        let out = f(&mut bag);
        bag.write(&mut state.data);
        out
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
