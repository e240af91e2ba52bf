//! HTML rendering module
//!
//! Maps a [`Page`] plus the per-request [`Layout`] (navigation state and
//! pending flashes) to a complete HTML document. All interpolated values are
//! escaped.

mod pages;

pub use pages::Page;

use crate::session::Flash;
use std::fmt::Write;

const SITE_NAME: &str = "ArticleBoard";

const STYLE: &str = r"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
       margin: 0; background: #f5f5f5; color: #333; line-height: 1.6; }
nav { background: #343a40; padding: 10px 20px; display: flex; justify-content: space-between; }
nav a { color: #ddd; margin-right: 15px; text-decoration: none; }
nav a:hover { color: #fff; }
.container { max-width: 900px; margin: 0 auto; padding: 20px; }
.alert { padding: 10px 15px; border-radius: 4px; margin-bottom: 15px; }
.alert-success { background: #d4edda; color: #155724; }
.alert-danger { background: #f8d7da; color: #721c24; }
.errors { color: #a94442; margin: 4px 0 0; padding-left: 18px; font-size: 0.9em; }
.field { margin-bottom: 15px; }
.field input, .field textarea { width: 100%; padding: 8px; box-sizing: border-box; }
.field textarea { min-height: 220px; }
table { width: 100%; border-collapse: collapse; background: white; }
th, td { border: 1px solid #ddd; padding: 10px; text-align: left; }
.btn { display: inline-block; padding: 6px 12px; border: none; border-radius: 4px;
       background: #667eea; color: white; text-decoration: none; cursor: pointer; }
.btn-danger { background: #c9302c; }
.inline { display: inline; }
";

/// Per-request chrome around a page
pub struct Layout<'a> {
    /// Logged-in username, shown in the navigation bar
    pub username: Option<&'a str>,
    pub flashes: &'a [Flash],
}

/// Render a complete HTML document
pub fn render(page: &Page<'_>, layout: &Layout<'_>) -> String {
    let mut html = String::with_capacity(4096);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | {SITE_NAME}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        title = escape_html(page.title()),
    );
    render_nav(&mut html, layout.username);
    html.push_str("<main class=\"container\">\n");
    render_flashes(&mut html, layout.flashes);
    page.write_body(&mut html);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_nav(html: &mut String, username: Option<&str>) {
    let _ = write!(
        html,
        "<nav><div><a href=\"/\"><strong>{SITE_NAME}</strong></a>\
         <a href=\"/\">Home</a><a href=\"/about\">About</a><a href=\"/articles\">Articles</a></div><div>"
    );
    match username {
        Some(name) => {
            let _ = write!(
                html,
                "<a href=\"/dashboard\">Dashboard ({})</a><a href=\"/logout\">Logout</a>",
                escape_html(name)
            );
        }
        None => html.push_str("<a href=\"/register\">Register</a><a href=\"/login\">Login</a>"),
    }
    html.push_str("</div></nav>\n");
}

fn render_flashes(html: &mut String, flashes: &[Flash]) {
    for flash in flashes {
        let _ = writeln!(
            html,
            "<div class=\"alert alert-{}\">{}</div>",
            flash.severity.as_str(),
            escape_html(&flash.message)
        );
    }
}

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
