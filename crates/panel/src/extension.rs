//! Debug-mode registration of the session panel.

use url::Url;

use sp_domain::config::DebugConfig;
use sp_domain::error::Result;
use sp_domain::trace::TraceEvent;
use sp_sessions::Session;

use crate::bar::Bar;
use crate::panel::{PanelInit, SessionPanel};
use crate::signal::Redirect;

/// Outcome of [`SessionPanelExtension::register`].
#[derive(Debug)]
pub enum Registration {
    /// Debug mode is off; nothing was constructed.
    Skipped,
    Registered,
    /// The request carried a delete signal.
    Redirect(Redirect),
}

/// Adds the session panel to the debug bar, but only in debug mode.
#[derive(Debug, Clone, Copy)]
pub struct SessionPanelExtension {
    debug_mode: bool,
}

impl SessionPanelExtension {
    pub const NAME: &'static str = "debugger.session";

    pub fn new(debug_mode: bool) -> Self {
        Self { debug_mode }
    }

    pub fn from_config(cfg: &DebugConfig) -> Self {
        Self::new(cfg.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.debug_mode
    }

    /// Build the panel for this request and add it to `bar`.
    pub fn register(&self, bar: &mut Bar, session: &Session, url: &Url) -> Result<Registration> {
        if !self.debug_mode {
            return Ok(Registration::Skipped);
        }
        match SessionPanel::new(session.clone(), url)? {
            PanelInit::Redirect(redirect) => Ok(Registration::Redirect(redirect)),
            PanelInit::Ready(panel) => {
                bar.add_panel(Box::new(panel));
                TraceEvent::PanelRegistered {
                    panel: Self::NAME.into(),
                }
                .emit();
                Ok(Registration::Registered)
            }
        }
    }
}
