//! Page rendering.
//!
//! Handlers hand a view model to a [`Renderer`]; the built-in
//! [`HtmlRenderer`] produces self-contained HTML. Anything user-supplied is
//! escaped on the way out.

use std::fmt::Write;

use wedding_types::models::{IssuedGuest, ResolvedGuest, Wish};

pub trait Renderer: Send + Sync {
    fn render_home(&self, view: &HomeView) -> String;
    fn render_admin(&self, view: &AdminView) -> String;
}

pub struct HomeView {
    pub guest: ResolvedGuest,
    pub wishes: Vec<Wish>,
    pub base_path: String,
}

pub struct AdminView {
    pub base_path: String,
    pub outcome: Option<AdminOutcome>,
}

pub enum AdminOutcome {
    Issued { guest: IssuedGuest, link: String },
    Failed(String),
}

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render_home(&self, view: &HomeView) -> String {
        let mut wishes = String::new();
        for wish in &view.wishes {
            let attendance = wish
                .attendance
                .as_deref()
                .map(|a| format!(" <span class=\"attendance\">{}</span>", escape(a)))
                .unwrap_or_default();
            let _ = write!(
                wishes,
                "<li class=\"wish\"><strong>{}</strong>{}<p>{}</p><time datetime=\"{}\">{}</time></li>",
                escape(&wish.sender_name),
                attendance,
                escape(&wish.content),
                wish.created_at.to_rfc3339(),
                wish.created_at.format("%d %b %Y %H:%M"),
            );
        }

        let gift = if view.guest.hide_gift {
            ""
        } else {
            GIFT_SECTION
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Wedding Invitation</title>
<link rel="stylesheet" href="{base}/css/style.css">
</head>
<body>
<section class="cover">
<p>Dear</p>
<h1 class="guest-name">{name}</h1>
<p>You are invited to our wedding.</p>
</section>
{gift}
<section class="wishes">
<h2>Wishes</h2>
<form id="wishForm">
<input type="text" name="senderName" placeholder="Your name" required>
<select name="attendance">
<option value="yes">Attending</option>
<option value="no">Not attending</option>
<option value="maybe">Not sure yet</option>
</select>
<textarea name="content" placeholder="Your wish" required></textarea>
<button type="submit">Send</button>
</form>
<ul class="wish-list">{wishes}</ul>
</section>
<script>
document.getElementById('wishForm').addEventListener('submit', async function (e) {{
    e.preventDefault();
    const body = Object.fromEntries(new FormData(e.target).entries());
    const res = await fetch('{base}/api/wish', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify(body)
    }});
    const data = await res.json();
    if (data.success) {{ location.reload(); }} else {{ alert(data.message); }}
}});
</script>
</body>
</html>
"#,
            base = escape(&view.base_path),
            name = escape(&view.guest.display_name),
            gift = gift,
            wishes = wishes,
        )
    }

    fn render_admin(&self, view: &AdminView) -> String {
        let result = match &view.outcome {
            None => String::new(),
            Some(AdminOutcome::Issued { guest, link }) => {
                let (class, title) = if guest.is_existing {
                    ("warning", "Guest Already Exists")
                } else {
                    ("success", "Guest Created Successfully")
                };
                let status = if guest.hide_gift { "Hidden" } else { "Visible" };
                format!(
                    r#"<div id="resultArea" class="{class}" style="display:block">
<strong>{title}</strong>
<ul><li>Name: <b>{name}</b></li><li>Gift Section: <b>{status}</b></li></ul>
Link:<div class="link-box"><a href="{link}" target="_blank">{link}</a></div>
</div>"#,
                    class = class,
                    title = title,
                    name = escape(&guest.name),
                    status = status,
                    link = escape(link),
                )
            }
            Some(AdminOutcome::Failed(message)) => format!(
                r#"<div id="resultArea" class="warning" style="display:block"><strong>Error:</strong> {}</div>"#,
                escape(message)
            ),
        };
        let result = if result.is_empty() {
            r#"<div id="resultArea"></div>"#.to_string()
        } else {
            result
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Create Wedding Guest</title>
<style>
body {{ font-family: 'Segoe UI', sans-serif; padding: 40px; max-width: 600px; margin: auto; background: #f5f0ed; }}
.container {{ background: white; padding: 30px; border-radius: 15px; }}
#resultArea {{ margin-top: 25px; padding: 15px; border-radius: 8px; display: none; }}
.success {{ background: #e8f5e9; color: #2e7d32; }}
.warning {{ background: #fff3e0; color: #ef6c00; }}
.link-box {{ word-break: break-all; background: white; padding: 10px; margin-top: 10px; font-family: monospace; }}
</style>
</head>
<body>
<div class="container">
<h2>Create New Guest Link</h2>
<form id="createForm" method="get" action="{base}/create-guest">
<label>Guest Name:<br><input type="text" id="nameInput" name="name" required></label>
<label><input type="checkbox" id="hideInput" name="isHide" value="1"> Hide Wedding Gift Section?</label>
<button type="submit" id="submitBtn">Generate Link</button>
</form>
{result}
</div>
<script>
const text = (s) => {{ const d = document.createElement('div'); d.textContent = s; return d.innerHTML; }};
document.getElementById('createForm').addEventListener('submit', async function (e) {{
    e.preventDefault();
    const btn = document.getElementById('submitBtn');
    const resultArea = document.getElementById('resultArea');
    const name = document.getElementById('nameInput').value;
    const isHide = document.getElementById('hideInput').checked ? 1 : 0;
    btn.innerText = 'Generating...';
    btn.disabled = true;
    try {{
        const res = await fetch('{base}/create-guest', {{
            method: 'POST',
            headers: {{ 'Content-Type': 'application/json' }},
            body: JSON.stringify({{ name, isHide }})
        }});
        const data = await res.json();
        if (data.success) {{
            resultArea.className = data.isExisting ? 'warning' : 'success';
            resultArea.innerHTML =
                '<strong>' + (data.isExisting ? 'Guest Already Exists' : 'Guest Created Successfully') + '</strong>' +
                '<ul><li>Name: <b>' + text(data.name) + '</b></li>' +
                '<li>Gift Section: <b>' + (data.isHide ? 'Hidden' : 'Visible') + '</b></li></ul>' +
                'Link:<div class="link-box"><a href="' + text(data.link) + '" target="_blank">' + text(data.link) + '</a></div>';
        }} else {{
            resultArea.className = 'warning';
            resultArea.innerHTML = '<strong>Error:</strong> ' + text(data.message);
        }}
        resultArea.style.display = 'block';
    }} catch (err) {{
        alert('Connection Error');
    }} finally {{
        btn.innerText = 'Generate Link';
        btn.disabled = false;
    }}
}});
</script>
</body>
</html>
"#,
            base = escape(&view.base_path),
            result = result,
        )
    }
}

const GIFT_SECTION: &str = r#"<section class="gift">
<h2>Wedding Gift</h2>
<p>Your presence is the greatest gift. Should you wish to send something more, the details are below.</p>
</section>"#;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
