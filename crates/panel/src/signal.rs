//! Delete signal carried in the request query string.
//!
//! `?do=session-panel-delete-session` marks the request.  The section to
//! delete is read from a parameter named after the sentinel itself, its
//! layer from `section-type`.  Without a section name the whole session is
//! destroyed.  Whatever happens, the request ends in a redirect to the same
//! URL with those three parameters removed.
//!
//! The signal is a plain GET without a token; it is only recognised while
//! the panel is registered, i.e. in debug mode.

use url::{form_urlencoded, Url};

use sp_domain::error::Result;
use sp_domain::trace::TraceEvent;
use sp_sessions::Session;

use crate::view::SectionType;

/// Value of `do` that marks a delete request.  Also the name of the
/// parameter carrying the section name.
pub const SIGNAL: &str = "session-panel-delete-session";
pub const DO_PARAM: &str = "do";
pub const SECTION_TYPE_PARAM: &str = "section-type";

fn is_signal_param(key: &str) -> bool {
    key == DO_PARAM || key == SIGNAL || key == SECTION_TYPE_PARAM
}

/// Last value of a query parameter.
pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .filter(|(k, _)| k == key)
        .last()
        .map(|(_, v)| v.into_owned())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Signal
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A delete instruction parsed from the request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSignal {
    pub section: Option<String>,
    pub section_type: Option<String>,
}

/// What a [`DeleteSignal`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteAction {
    DestroySession,
    RemoveManaged(String),
    RemoveRaw(String),
    /// Section named but its type tag is missing or unknown.
    Ignored {
        section: String,
        section_type: Option<String>,
    },
}

impl DeleteSignal {
    /// Parse the signal, if the URL carries one.
    pub fn from_url(url: &Url) -> Option<Self> {
        if query_param(url, DO_PARAM).as_deref() != Some(SIGNAL) {
            return None;
        }
        Some(Self {
            section: query_param(url, SIGNAL),
            section_type: query_param(url, SECTION_TYPE_PARAM),
        })
    }

    pub fn action(&self) -> DeleteAction {
        let section = match self.section.as_deref() {
            Some(s) if !s.is_empty() => s.to_owned(),
            _ => return DeleteAction::DestroySession,
        };
        match self.section_type.as_deref().and_then(SectionType::from_tag) {
            Some(SectionType::ManagedSession) => DeleteAction::RemoveManaged(section),
            Some(SectionType::RawSession) => DeleteAction::RemoveRaw(section),
            None => DeleteAction::Ignored {
                section,
                section_type: self.section_type.clone(),
            },
        }
    }
}

/// Apply a delete action to a started session.
pub fn apply(session: &Session, action: &DeleteAction) -> Result<()> {
    match action {
        DeleteAction::DestroySession => session.destroy()?,
        DeleteAction::RemoveManaged(name) => {
            session.section(name).remove()?;
            TraceEvent::SectionRemoved {
                section: name.clone(),
                section_type: SectionType::ManagedSession.tag().into(),
            }
            .emit();
        }
        DeleteAction::RemoveRaw(key) => {
            session.raw_remove(key);
            TraceEvent::SectionRemoved {
                section: key.clone(),
                section_type: SectionType::RawSession.tag().into(),
            }
            .emit();
        }
        DeleteAction::Ignored {
            section,
            section_type,
        } => {
            tracing::debug!(
                section = %section,
                section_type = ?section_type,
                "ignoring delete signal with unknown section type"
            );
        }
    }
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// URLs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Same URL without the signal parameters.  The path and every other
/// parameter are kept byte for byte, in their original order.
pub fn strip_signal(url: &Url) -> Url {
    let kept: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty() && !is_signal_segment(segment))
        .collect();

    let mut out = url.clone();
    if kept.is_empty() {
        out.set_query(None);
    } else {
        out.set_query(Some(&kept.join("&")));
    }
    out
}

/// Only the key is decoded; the raw segment itself is never rewritten.
fn is_signal_segment(segment: &str) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .is_some_and(|(key, _)| is_signal_param(&key))
}

/// Link that deletes `section` of the given layer, or the whole session when
/// `section` is `None`.
pub fn delete_link(url: &Url, section: Option<&str>, section_type: Option<SectionType>) -> Url {
    let mut out = strip_signal(url);
    {
        let mut pairs = out.query_pairs_mut();
        pairs.append_pair(DO_PARAM, SIGNAL);
        if let Some(section) = section {
            pairs.append_pair(SIGNAL, section);
        }
        if let Some(ty) = section_type {
            pairs.append_pair(SECTION_TYPE_PARAM, ty.tag());
        }
    }
    out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Processing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the client is sent after a signal.  The host must answer with this
/// redirect and stop handling the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: Url,
}

/// Detect and execute the delete signal.  `None` when the URL carries no
/// signal; otherwise the session has been mutated and the caller must
/// redirect.
pub fn process(session: &Session, url: &Url) -> Result<Option<Redirect>> {
    let Some(signal) = DeleteSignal::from_url(url) else {
        return Ok(None);
    };

    if !session.is_started() {
        session.start()?;
    }

    let action = signal.action();
    apply(session, &action)?;

    let location = strip_signal(url);
    TraceEvent::SignalHandled {
        action: format!("{action:?}"),
        redirect: location.to_string(),
    }
    .emit();

    Ok(Some(Redirect { location }))
}
