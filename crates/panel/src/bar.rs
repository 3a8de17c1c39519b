//! Debug bar host.
//!
//! Panels register through [`Bar::add_panel`]; the bar renders every
//! registered panel as a collapsible tab and is spliced into HTML pages.

use sp_domain::error::Result;

use crate::templates::esc;

/// Something the debug bar can show: a compact tab and a detail panel.
pub trait BarPanel: Send + Sync {
    /// Stable identifier, used in element ids.
    fn id(&self) -> &str;
    fn tab(&self) -> Result<String>;
    fn panel(&self) -> Result<String>;
}

#[derive(Default)]
pub struct Bar {
    panels: Vec<Box<dyn BarPanel>>,
}

impl Bar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_panel(&mut self, panel: Box<dyn BarPanel>) {
        tracing::debug!(panel = panel.id(), "debug bar panel added");
        self.panels.push(panel);
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panel_ids(&self) -> Vec<&str> {
        self.panels.iter().map(|p| p.id()).collect()
    }

    /// Render all panels as one self-contained fragment.  Empty when no
    /// panel is registered.  A failing panel is shown as an error box.
    pub fn render(&self) -> String {
        if self.panels.is_empty() {
            return String::new();
        }

        let items: String = self
            .panels
            .iter()
            .map(|p| {
                let id = esc(p.id());
                let (tab, body) = match p.tab().and_then(|t| Ok((t, p.panel()?))) {
                    Ok(parts) => parts,
                    Err(e) => {
                        tracing::warn!(panel = p.id(), error = %e, "debug bar panel failed");
                        (
                            format!("<span class=\"debug-bar-error\">{id}</span>"),
                            format!("<pre class=\"debug-bar-error\">{}</pre>", esc(&e.to_string())),
                        )
                    }
                };
                format!(
                    r#"<details class="debug-bar-item" id="debug-bar-{id}"><summary>{tab}</summary><div class="debug-bar-panel">{body}</div></details>"#
                )
            })
            .collect();

        format!(
            r#"<div id="debug-bar">
<style>
  #debug-bar {{ position: fixed; right: 0; bottom: 0; z-index: 2147483647; font: 13px/1.4 system-ui, sans-serif; background: #f7f7f2; border: 1px solid #c6c6bd; color: #333; max-width: 100%; }}
  #debug-bar summary {{ cursor: pointer; padding: 2px 8px; }}
  #debug-bar .debug-bar-panel {{ max-height: 70vh; overflow: auto; padding: 0.5rem 1rem; background: #fff; }}
  #debug-bar table {{ border-collapse: collapse; }}
  #debug-bar th, #debug-bar td {{ border: 1px solid #e6e6e6; padding: 2px 6px; text-align: left; vertical-align: top; }}
  #debug-bar pre {{ margin: 0; }}
  #debug-bar .debug-bar-error {{ color: #c00; }}
</style>
{items}
</div>"#
        )
    }

    /// Insert the rendered bar before the closing `</body>` tag, or append it
    /// when the page has none.
    pub fn inject(&self, html: &str) -> String {
        let bar = self.render();
        if bar.is_empty() {
            return html.to_owned();
        }
        // ASCII lowercasing keeps byte offsets intact.
        match html.to_ascii_lowercase().rfind("</body>") {
            Some(pos) => {
                let mut out = String::with_capacity(html.len() + bar.len());
                out.push_str(&html[..pos]);
                out.push_str(&bar);
                out.push_str(&html[pos..]);
                out
            }
            None => format!("{html}{bar}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_domain::error::Error;

    struct Static(&'static str);

    impl BarPanel for Static {
        fn id(&self) -> &str {
            self.0
        }
        fn tab(&self) -> Result<String> {
            Ok(format!("tab-{}", self.0))
        }
        fn panel(&self) -> Result<String> {
            Ok(format!("panel-{}", self.0))
        }
    }

    struct Broken;

    impl BarPanel for Broken {
        fn id(&self) -> &str {
            "broken"
        }
        fn tab(&self) -> Result<String> {
            Ok("tab".into())
        }
        fn panel(&self) -> Result<String> {
            Err(Error::Other("store unavailable".into()))
        }
    }

    #[test]
    fn empty_bar_renders_nothing() {
        let bar = Bar::new();
        assert!(bar.render().is_empty());
        assert_eq!(bar.inject("<body></body>"), "<body></body>");
    }

    #[test]
    fn panels_render_in_registration_order() {
        let mut bar = Bar::new();
        bar.add_panel(Box::new(Static("a")));
        bar.add_panel(Box::new(Static("b")));
        assert_eq!(bar.panel_ids(), vec!["a", "b"]);

        let html = bar.render();
        let a = html.find("panel-a").unwrap();
        let b = html.find("panel-b").unwrap();
        assert!(a < b);
        assert!(html.contains("<summary>tab-a</summary>"));
    }

    #[test]
    fn inject_before_closing_body() {
        let mut bar = Bar::new();
        bar.add_panel(Box::new(Static("a")));
        let page = bar.inject("<html><BODY><p>hi</p></BODY></html>");
        let bar_pos = page.find("id=\"debug-bar\"").unwrap();
        let body_pos = page.find("</BODY>").unwrap();
        assert!(bar_pos < body_pos);
        assert!(page.ends_with("</BODY></html>"));
    }

    #[test]
    fn inject_appends_without_body() {
        let mut bar = Bar::new();
        bar.add_panel(Box::new(Static("a")));
        let page = bar.inject("<p>fragment</p>");
        assert!(page.starts_with("<p>fragment</p><div id=\"debug-bar\">"));
    }

    #[test]
    fn failing_panel_shows_error() {
        let mut bar = Bar::new();
        bar.add_panel(Box::new(Broken));
        let html = bar.render();
        assert!(html.contains("session: store unavailable"));
    }
}
