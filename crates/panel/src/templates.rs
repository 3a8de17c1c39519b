//! HTML fragments for the session tab and panel.

use serde_json::Value;

use crate::time::relative_duration;
use crate::view::{SectionRecord, SectionType};

/// Escape text for HTML element content and quoted attributes.
pub fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Collapsed dump of a value: a one-line summary that expands to pretty JSON.
pub fn dump(value: &Value) -> String {
    let summary = match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("string ({})", s.chars().count()),
        Value::Array(a) => format!("array ({})", a.len()),
        Value::Object(o) => format!("object ({})", o.len()),
    };
    let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
    format!(
        r#"<details class="sp-dump"><summary>{}</summary><pre>{}</pre></details>"#,
        esc(&summary),
        esc(&pretty)
    )
}

const ICON: &str = r##"<svg viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path fill="#5f6b7a" d="M2 3h12v2H2zm0 4h12v2H2zm0 4h8v2H2z"/></svg>"##;

pub fn render_tab(section_count: usize) -> String {
    format!(
        r#"<span class="sp-tab" title="Session">{ICON}<span class="sp-label">Session</span> <span class="sp-badge">{section_count}</span></span>"#
    )
}

/// Values the panel fragment is built from.
pub struct PanelContext<'a> {
    pub session_id: Option<&'a str>,
    pub max_lifetime_secs: u64,
    pub sections: Vec<SectionRecord>,
    pub delete_link: &'a dyn Fn(Option<&str>, Option<SectionType>) -> String,
}

pub fn render_panel(ctx: &PanelContext<'_>) -> String {
    let id_html = match ctx.session_id {
        Some(id) => format!("<code>{}</code>", esc(id)),
        None => "<em>no session</em>".to_owned(),
    };
    let max_time = i64::try_from(ctx.max_lifetime_secs)
        .map(relative_duration)
        .unwrap_or_else(|_| ctx.max_lifetime_secs.to_string());

    let rows_html = if ctx.sections.is_empty() {
        r#"<tr><td colspan="5"><em>empty</em></td></tr>"#.to_owned()
    } else {
        ctx.sections
            .iter()
            .map(|s| {
                let link = (ctx.delete_link)(Some(s.title.as_str()), Some(s.section_type));
                format!(
                    r#"<tr class="sp-{ty}">
  <th>{title}</th>
  <td>{ty}</td>
  <td>{expiration}</td>
  <td>{data}</td>
  <td><a href="{link}" title="delete section">delete</a></td>
</tr>"#,
                    ty = s.section_type.tag(),
                    title = esc(&s.title),
                    expiration = esc(&s.expiration.to_string()),
                    data = dump(&s.data),
                    link = esc(&link),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let destroy_link = esc(&(ctx.delete_link)(None, None));

    format!(
        r#"<div class="sp-panel">
<h1>Session {id_html}</h1>
<p>Max lifetime: {max_time} &middot; <a href="{destroy_link}" title="destroy session">delete session</a></p>
<table>
<thead><tr><th>Section</th><th>Type</th><th>Expiration</th><th>Data</th><th></th></tr></thead>
<tbody>
{rows_html}
</tbody>
</table>
</div>"#,
        max_time = esc(&max_time),
    )
}
