//! HTTP session subsystem hosting the debug panel.
//!
//! Two layers over one store: the raw flat key/value session data, and
//! managed sections (named namespaces with per-section expiration) kept under
//! a reserved raw key.

pub mod section;
pub mod session;
pub mod store;

pub use section::{Expiry, SectionMeta, SessionSection, RESERVED_KEY};
pub use session::{Session, SessionOptions};
pub use store::{SessionStore, StoredSession};
