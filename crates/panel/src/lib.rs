//! Session panel for the debug bar.
//!
//! Lists the managed sections and raw keys of the current session with their
//! payloads and expirations, and handles the delete signal carried in the
//! request URL.

pub mod bar;
pub mod extension;
pub mod panel;
pub mod signal;
pub mod templates;
pub mod time;
pub mod view;

pub use bar::{Bar, BarPanel};
pub use extension::{Registration, SessionPanelExtension};
pub use panel::{PanelInit, SessionPanel};
pub use signal::{DeleteAction, DeleteSignal, Redirect};
pub use view::{Expiration, SectionRecord, SectionType};
