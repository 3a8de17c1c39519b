//! The session panel.
//!
//! Construction captures the request URL and runs the delete signal first:
//! a request carrying the signal never gets a panel, only a redirect.

use chrono::Utc;
use url::Url;

use sp_domain::error::Result;
use sp_sessions::Session;

use crate::bar::BarPanel;
use crate::signal::{self, Redirect};
use crate::templates::{self, PanelContext};
use crate::view::{self, SectionRecord, SectionType};

/// Result of constructing a [`SessionPanel`].
#[derive(Debug)]
pub enum PanelInit {
    Ready(SessionPanel),
    /// A delete signal was handled; answer with this redirect and stop.
    Redirect(Redirect),
}

pub struct SessionPanel {
    session: Session,
    url: Url,
}

impl std::fmt::Debug for SessionPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPanel")
            .field("session_id", &self.session.id())
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl SessionPanel {
    pub fn new(session: Session, url: &Url) -> Result<PanelInit> {
        if let Some(redirect) = signal::process(&session, url)? {
            return Ok(PanelInit::Redirect(redirect));
        }
        Ok(PanelInit::Ready(Self {
            session,
            url: url.clone(),
        }))
    }

    /// Managed sections followed by raw keys, with expirations computed
    /// against the current time.
    pub fn sections(&self) -> Result<impl Iterator<Item = SectionRecord> + '_> {
        view::sections_at(&self.session, Utc::now().timestamp())
    }

    /// URL deleting `section` of the given layer, or the whole session.
    pub fn delete_link(&self, section: Option<&str>, section_type: Option<SectionType>) -> String {
        signal::delete_link(&self.url, section, section_type).into()
    }
}

impl BarPanel for SessionPanel {
    fn id(&self) -> &str {
        "session"
    }

    fn tab(&self) -> Result<String> {
        Ok(templates::render_tab(self.sections()?.count()))
    }

    fn panel(&self) -> Result<String> {
        let sections: Vec<SectionRecord> = self.sections()?.collect();
        let session_id = self.session.id();
        let delete_link = |section: Option<&str>, ty: Option<SectionType>| {
            self.delete_link(section, ty)
        };
        Ok(templates::render_panel(&PanelContext {
            session_id: session_id.as_deref(),
            max_lifetime_secs: self.session.options().gc_maxlifetime,
            sections,
            delete_link: &delete_link,
        }))
    }
}
