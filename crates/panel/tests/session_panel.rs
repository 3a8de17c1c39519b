use std::sync::Arc;

use serde_json::json;
use url::Url;

use sp_panel::{Bar, BarPanel, PanelInit, Registration, SectionType, SessionPanel, SessionPanelExtension};
use sp_sessions::{Expiry, Session, SessionOptions, SessionStore};

struct Fixture {
    store: Arc<SessionStore>,
    id: String,
}

impl Fixture {
    /// A stored session with a managed `cart` section and a raw `user_id`.
    fn new() -> Self {
        let store = Arc::new(SessionStore::in_memory());
        let session = Self::open(&store, None);
        session.section("cart").set("items", json!(["apple"])).unwrap();
        session.section("cart").set_expiration(Expiry::in_secs(3630)).unwrap();
        session.raw_set("user_id", json!(42)).unwrap();
        session.commit().unwrap();
        let id = session.id().unwrap();
        Self { store, id }
    }

    fn open(store: &Arc<SessionStore>, id: Option<String>) -> Session {
        Session::new(store.clone(), Arc::new(SessionOptions::default()), id)
    }

    fn request(&self) -> Session {
        Self::open(&self.store, Some(self.id.clone()))
    }
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn redirect_of(init: PanelInit) -> Url {
    match init {
        PanelInit::Redirect(r) => r.location,
        PanelInit::Ready(_) => panic!("expected a redirect"),
    }
}

#[test]
fn plain_request_builds_panel() {
    let fx = Fixture::new();
    let init = SessionPanel::new(fx.request(), &url("http://app.test/?page=1")).unwrap();
    let PanelInit::Ready(panel) = init else {
        panic!("expected a panel");
    };

    let records: Vec<_> = panel.sections().unwrap().collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "cart");
    assert_eq!(records[0].section_type, SectionType::ManagedSession);
    assert_eq!(records[0].expiration.to_string(), "1 hour");
    assert_eq!(records[1].title, "user_id");
    assert_eq!(records[1].section_type, SectionType::RawSession);
}

#[test]
fn each_render_reads_the_clock() {
    let store = Arc::new(SessionStore::in_memory());
    let session = Fixture::open(&store, None);
    session.section("flash").set("msg", json!("hi")).unwrap();
    session
        .section("flash")
        .set_expiration(Expiry::in_secs(30))
        .unwrap();

    let PanelInit::Ready(panel) = SessionPanel::new(session, &url("http://app.test/")).unwrap()
    else {
        panic!("expected a panel");
    };
    let expiration = |panel: &SessionPanel| panel.sections().unwrap().next().unwrap().expiration;

    let first = expiration(&panel);
    std::thread::sleep(std::time::Duration::from_millis(2100));
    let second = expiration(&panel);
    assert_ne!(first, second);
}

#[test]
fn managed_section_delete_redirects_to_clean_url() {
    let fx = Fixture::new();
    let session = fx.request();
    let init = SessionPanel::new(
        session.clone(),
        &url("http://app.test/shop?page=2&do=session-panel-delete-session&session-panel-delete-session=cart&section-type=managed-session&sort=asc"),
    )
    .unwrap();

    assert_eq!(redirect_of(init).as_str(), "http://app.test/shop?page=2&sort=asc");
    assert!(session.section_names().unwrap().is_empty());
    assert_eq!(session.raw_get("user_id"), Some(json!(42)));

    session.commit().unwrap();
    let next = fx.request();
    assert!(next.section_names().unwrap().is_empty());
}

#[test]
fn raw_key_delete() {
    let fx = Fixture::new();
    let session = fx.request();
    let init = SessionPanel::new(
        session.clone(),
        &url("http://app.test/?do=session-panel-delete-session&session-panel-delete-session=user_id&section-type=raw-session"),
    )
    .unwrap();

    assert_eq!(redirect_of(init).as_str(), "http://app.test/");
    assert!(session.raw_get("user_id").is_none());
    assert_eq!(session.section_names().unwrap(), vec!["cart".to_string()]);
}

#[test]
fn missing_section_destroys_session() {
    let fx = Fixture::new();
    let session = fx.request();
    let init = SessionPanel::new(
        session.clone(),
        &url("http://app.test/a?x=1&do=session-panel-delete-session"),
    )
    .unwrap();

    assert_eq!(redirect_of(init).as_str(), "http://app.test/a?x=1");
    assert!(session.is_destroyed());
    assert!(!fx.store.contains(&fx.id));
}

#[test]
fn unknown_type_deletes_nothing_but_still_redirects() {
    let fx = Fixture::new();
    let session = fx.request();
    let init = SessionPanel::new(
        session.clone(),
        &url("http://app.test/?do=session-panel-delete-session&session-panel-delete-session=cart&section-type=garbage"),
    )
    .unwrap();

    assert_eq!(redirect_of(init).as_str(), "http://app.test/");
    assert_eq!(session.section_names().unwrap(), vec!["cart".to_string()]);
    assert_eq!(session.raw_get("user_id"), Some(json!(42)));
}

#[test]
fn signal_starts_session_first() {
    let fx = Fixture::new();
    let session = fx.request();
    assert!(!session.is_started());
    let _ = SessionPanel::new(
        session.clone(),
        &url("http://app.test/?do=session-panel-delete-session&session-panel-delete-session=cart"),
    )
    .unwrap();
    assert!(session.is_started());
}

#[test]
fn panel_delete_links_target_their_layer() {
    let fx = Fixture::new();
    let PanelInit::Ready(panel) =
        SessionPanel::new(fx.request(), &url("http://app.test/list?page=3")).unwrap()
    else {
        panic!("expected a panel");
    };

    let html = panel.panel().unwrap();
    assert!(html.contains(
        "http://app.test/list?page=3&amp;do=session-panel-delete-session&amp;session-panel-delete-session=cart&amp;section-type=managed-session"
    ));
    assert!(html.contains(
        "http://app.test/list?page=3&amp;do=session-panel-delete-session&amp;session-panel-delete-session=user_id&amp;section-type=raw-session"
    ));
    assert!(html.contains("http://app.test/list?page=3&amp;do=session-panel-delete-session\""));
    assert!(panel.tab().unwrap().contains(">2</span>"));
}

#[test]
fn extension_skips_when_debug_is_off() {
    let fx = Fixture::new();
    let session = fx.request();
    let mut bar = Bar::new();
    let outcome = SessionPanelExtension::new(false)
        .register(
            &mut bar,
            &session,
            &url("http://app.test/?do=session-panel-delete-session"),
        )
        .unwrap();

    assert!(matches!(outcome, Registration::Skipped));
    assert!(bar.is_empty());
    assert!(!session.is_started());
    assert!(fx.store.contains(&fx.id));
}

#[test]
fn extension_registers_in_debug_mode() {
    let fx = Fixture::new();
    let mut bar = Bar::new();
    let outcome = SessionPanelExtension::new(true)
        .register(&mut bar, &fx.request(), &url("http://app.test/"))
        .unwrap();

    assert!(matches!(outcome, Registration::Registered));
    assert_eq!(bar.panel_ids(), vec!["session"]);
    assert!(bar.render().contains("user_id"));
}

#[test]
fn extension_passes_redirect_through() {
    let fx = Fixture::new();
    let mut bar = Bar::new();
    let outcome = SessionPanelExtension::new(true)
        .register(
            &mut bar,
            &fx.request(),
            &url("http://app.test/?do=session-panel-delete-session"),
        )
        .unwrap();

    assert!(matches!(outcome, Registration::Redirect(_)));
    assert!(bar.is_empty());
}
