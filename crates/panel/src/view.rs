//! Unified view over the managed sections and the raw session keys.
//!
//! Managed records always come first, raw records second.  Each record is
//! tagged with the layer it came from so a delete link built from it targets
//! the right store.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use sp_domain::error::Result;
use sp_sessions::{SectionMeta, Session, RESERVED_KEY};

use crate::time::relative_duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Record types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which session layer a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    ManagedSession,
    RawSession,
}

impl SectionType {
    /// Tag used in the `section-type` query parameter.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::ManagedSession => "managed-session",
            Self::RawSession => "raw-session",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "managed-session" => Some(Self::ManagedSession),
            "raw-session" => Some(Self::RawSession),
            _ => None,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiration {
    /// Follows the session's global lifetime.
    Inherited,
    /// Dropped when the browser closes.
    Browser,
    /// Formatted distance to an absolute expiry.
    In(String),
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inherited => f.write_str("inherited"),
            Self::Browser => f.write_str("Browser"),
            Self::In(s) => f.write_str(s),
        }
    }
}

/// One displayed row of the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRecord {
    pub title: String,
    pub data: Value,
    pub expiration: Expiration,
    pub section_type: SectionType,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sources
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolve a managed section's expiration.  The browser flag wins over a
/// timestamp.
pub fn resolve_expiration(meta: Option<&SectionMeta>, now: i64) -> Expiration {
    match meta {
        Some(m) if m.browser => Expiration::Browser,
        Some(SectionMeta {
            expires_at: Some(t),
            ..
        }) => Expiration::In(relative_duration(t.saturating_sub(now))),
        _ => Expiration::Inherited,
    }
}

/// Records for every managed section.  Payloads and metadata are looked up
/// as the iterator advances.
pub fn managed_sections(
    session: &Session,
    now: i64,
) -> Result<impl Iterator<Item = SectionRecord> + '_> {
    let names = session.section_names()?;
    Ok(names.into_iter().map(move |name| {
        let data = session
            .section(&name)
            .data()
            .map(Value::Object)
            .unwrap_or(Value::Null);
        let expiration = resolve_expiration(session.section_meta(&name).as_ref(), now);
        SectionRecord {
            title: name,
            data,
            expiration,
            section_type: SectionType::ManagedSession,
        }
    }))
}

/// Records for every raw top-level key except the managed layer's reserved
/// key.  Empty when the client has no session; an existing session is
/// started.
pub fn raw_sections(session: &Session) -> Result<impl Iterator<Item = SectionRecord>> {
    let mut records = Vec::new();

    if session.exists() {
        session.start()?;

        for key in session.raw_keys() {
            if key == RESERVED_KEY {
                continue;
            }
            let data = session.raw_get(&key).unwrap_or(Value::Null);
            records.push(SectionRecord {
                title: key,
                data,
                expiration: Expiration::Inherited,
                section_type: SectionType::RawSession,
            });
        }
    }

    Ok(records.into_iter())
}

/// Managed records followed by raw records.
pub fn sections_at(
    session: &Session,
    now: i64,
) -> Result<impl Iterator<Item = SectionRecord> + '_> {
    let managed = managed_sections(session, now)?;
    let raw = raw_sections(session)?;
    Ok(managed.chain(raw))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use sp_sessions::{Expiry, SessionOptions, SessionStore};

    const NOW: i64 = 1_700_000_000;

    fn session_with(store: &Arc<SessionStore>, id: Option<String>) -> Session {
        Session::new(store.clone(), Arc::new(SessionOptions::default()), id)
    }

    /// A committed session with one managed section and two raw keys,
    /// reopened as a new request that has not started it yet.
    fn populated() -> Session {
        let store = Arc::new(SessionStore::in_memory());
        let first = session_with(&store, None);
        first.section("cart").set("items", json!(["apple"])).unwrap();
        first.raw_set("user_id", json!(42)).unwrap();
        first.raw_set("locale", json!("cs")).unwrap();
        first.commit().unwrap();
        session_with(&store, first.id())
    }

    #[test]
    fn tags_round_trip() {
        for ty in [SectionType::ManagedSession, SectionType::RawSession] {
            assert_eq!(SectionType::from_tag(ty.tag()), Some(ty));
        }
        assert_eq!(SectionType::from_tag("php-session"), None);
    }

    #[test]
    fn expiration_resolution() {
        assert_eq!(resolve_expiration(None, NOW), Expiration::Inherited);
        assert_eq!(
            resolve_expiration(Some(&SectionMeta::default()), NOW),
            Expiration::Inherited
        );
        let timed = SectionMeta {
            expires_at: Some(NOW + 3 * 86_400),
            browser: false,
        };
        assert_eq!(
            resolve_expiration(Some(&timed), NOW),
            Expiration::In("3 days".into())
        );
        let both = SectionMeta {
            expires_at: Some(NOW + 60),
            browser: true,
        };
        assert_eq!(resolve_expiration(Some(&both), NOW), Expiration::Browser);
    }

    #[test]
    fn far_expiry_reads_as_years() {
        let far = SectionMeta {
            expires_at: Some(NOW + 2 * crate::time::YEAR),
            browser: false,
        };
        assert_eq!(
            resolve_expiration(Some(&far), NOW),
            Expiration::In("2 years".into())
        );
    }

    #[test]
    fn expiration_display() {
        assert_eq!(Expiration::Inherited.to_string(), "inherited");
        assert_eq!(Expiration::Browser.to_string(), "Browser");
        assert_eq!(Expiration::In("1 hour".into()).to_string(), "1 hour");
    }

    #[test]
    fn managed_records_precede_raw_records() {
        let session = populated();
        let records: Vec<_> = sections_at(&session, NOW).unwrap().collect();

        let types: Vec<_> = records.iter().map(|r| r.section_type).collect();
        assert_eq!(
            types,
            vec![
                SectionType::ManagedSession,
                SectionType::RawSession,
                SectionType::RawSession
            ]
        );
        assert_eq!(records[0].title, "cart");
        assert_eq!(records[0].data, json!({"items": ["apple"]}));
        assert_eq!(records[0].expiration, Expiration::Inherited);
    }

    #[test]
    fn reserved_key_never_listed() {
        let session = populated();
        assert!(sections_at(&session, NOW)
            .unwrap()
            .all(|r| r.title != RESERVED_KEY));
        let raw: Vec<_> = raw_sections(&session).unwrap().map(|r| r.title).collect();
        assert_eq!(raw.len(), 2);
        assert!(raw.contains(&"user_id".to_string()));
        assert!(raw.contains(&"locale".to_string()));
    }

    #[test]
    fn raw_records_inherit_expiration() {
        let session = populated();
        assert!(raw_sections(&session)
            .unwrap()
            .all(|r| r.expiration == Expiration::Inherited));
    }

    #[test]
    fn no_session_means_no_records_and_no_start() {
        let store = Arc::new(SessionStore::in_memory());
        let session = session_with(&store, None);
        assert_eq!(sections_at(&session, NOW).unwrap().count(), 0);
        assert!(!session.is_started());
        assert!(session.id().is_none());
    }

    #[test]
    fn existing_session_is_started_lazily() {
        let session = populated();
        assert!(!session.is_started());
        let _ = raw_sections(&session).unwrap();
        assert!(session.is_started());
    }

    #[test]
    fn timed_and_browser_sections() {
        let session = populated();
        session
            .section("flash")
            .set_expiration(Expiry::At(NOW + 7200))
            .unwrap();
        session.section("flash").set("msg", json!("hi")).unwrap();
        session.section("tab").set("open", json!(true)).unwrap();
        session.section("tab").set_expiration(Expiry::Browser).unwrap();

        let managed: Vec<_> = managed_sections(&session, NOW).unwrap().collect();
        let by_title = |t: &str| managed.iter().find(|r| r.title == t).unwrap().clone();
        assert_eq!(by_title("flash").expiration, Expiration::In("2 hours".into()));
        assert_eq!(by_title("tab").expiration, Expiration::Browser);
        assert_eq!(by_title("cart").expiration, Expiration::Inherited);
    }

    #[test]
    fn rendering_twice_is_stable() {
        let session = populated();
        let first: Vec<_> = sections_at(&session, NOW).unwrap().collect();
        let second: Vec<_> = sections_at(&session, NOW).unwrap().collect();
        assert_eq!(first, second);
    }
}
