//! Managed session sections.
//!
//! Sections are named namespaces layered on top of the raw session.  Their
//! payloads and expiration metadata are kept under a single reserved raw key
//! ([`RESERVED_KEY`]) so the raw view can skip them.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sp_domain::error::Result;

use crate::session::Session;

/// Raw key under which the managed layer stores its bookkeeping.
pub const RESERVED_KEY: &str = "__sections";

/// Per-section expiration metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMeta {
    /// Absolute expiry as a unix timestamp (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Section is dropped when the browser closes.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub browser: bool,
}

impl SectionMeta {
    pub fn is_empty(&self) -> bool {
        self.expires_at.is_none() && !self.browser
    }
}

/// Expiration policy for [`SessionSection::set_expiration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Follow the session's global lifetime.
    Inherit,
    /// Expire when the browser is closed.
    Browser,
    /// Expire at this unix timestamp.
    At(i64),
}

impl Expiry {
    /// Expire `secs` seconds from now.
    pub fn in_secs(secs: i64) -> Self {
        Self::At(Utc::now().timestamp() + secs)
    }
}

/// Everything the managed layer keeps under [`RESERVED_KEY`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct SectionBag {
    #[serde(default)]
    pub data: BTreeMap<String, Map<String, Value>>,
    #[serde(default)]
    pub meta: BTreeMap<String, SectionMeta>,
}

impl SectionBag {
    pub fn read(raw: &Map<String, Value>) -> Self {
        raw.get(RESERVED_KEY)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn write(self, raw: &mut Map<String, Value>) {
        if self.data.is_empty() && self.meta.is_empty() {
            raw.remove(RESERVED_KEY);
            return;
        }
        match serde_json::to_value(&self) {
            Ok(v) => {
                raw.insert(RESERVED_KEY.to_owned(), v);
            }
            Err(e) => tracing::warn!(error = %e, "failed to store session sections"),
        }
    }

    /// Drop sections whose absolute expiry has passed.  Returns their names.
    pub fn expire(&mut self, now: i64) -> Vec<String> {
        let expired: Vec<String> = self
            .meta
            .iter()
            .filter(|(_, m)| !m.browser && m.expires_at.is_some_and(|t| t <= now))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &expired {
            self.data.remove(name);
            self.meta.remove(name);
        }
        expired
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Section handle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Handle to one managed section of a [`Session`].
///
/// Writes start the session when needed.
#[derive(Clone)]
pub struct SessionSection {
    session: Session,
    name: String,
}

impl SessionSection {
    pub(crate) fn new(session: Session, name: String) -> Self {
        Self { session, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read one variable of this section.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.session
            .with_bag(|bag| bag.data.get(&self.name).and_then(|d| d.get(key)).cloned())
    }

    /// Whole payload of this section.
    pub fn data(&self) -> Option<Map<String, Value>> {
        self.session.with_bag(|bag| bag.data.get(&self.name).cloned())
    }

    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        self.session.start()?;
        self.session.update_bag(|bag| {
            bag.data
                .entry(self.name.clone())
                .or_default()
                .insert(key.to_owned(), value);
        });
        Ok(())
    }

    pub fn remove_key(&self, key: &str) -> Result<Option<Value>> {
        self.session.start()?;
        Ok(self.session.update_bag(|bag| {
            bag.data.get_mut(&self.name).and_then(|d| d.remove(key))
        }))
    }

    pub fn set_expiration(&self, expiry: Expiry) -> Result<()> {
        self.session.start()?;
        self.session.update_bag(|bag| match expiry {
            Expiry::Inherit => {
                bag.meta.remove(&self.name);
            }
            Expiry::Browser => {
                bag.meta.insert(
                    self.name.clone(),
                    SectionMeta {
                        expires_at: None,
                        browser: true,
                    },
                );
            }
            Expiry::At(ts) => {
                bag.meta.insert(
                    self.name.clone(),
                    SectionMeta {
                        expires_at: Some(ts),
                        browser: false,
                    },
                );
            }
        });
        Ok(())
    }

    /// Remove the whole section together with its metadata.
    pub fn remove(&self) -> Result<()> {
        self.session.start()?;
        self.session.update_bag(|bag| {
            bag.data.remove(&self.name);
            bag.meta.remove(&self.name);
        });
        Ok(())
    }
}
