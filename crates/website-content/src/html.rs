//! Minimal HTML helpers shared by every page.

use crate::lang::Lang;
use std::fmt::Write;

/// Escape text for use in element content and quoted attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Wrap a page body into the common document layout.
///
/// `title` and `site_name` are escaped here, `body` must already be HTML.
#[must_use]
pub fn layout(lang: Lang, title: &str, site_name: &str, body: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n\
         <html lang=\"{lang}\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} - {site}</title>\n\
         <style>{STYLE}</style>\n\
         </head>\n\
         <body>\n\
         <header><a href=\"/\">{site}</a> \
         <nav><a href=\"/info\">Info</a> <a href=\"/resume\">Resume</a> \
         <a href=\"/contact\">Contact</a></nav></header>\n\
         <main>\n{body}\n</main>\n\
         <footer><a href=\"/legal\">Legal</a></footer>\n\
         </body>\n\
         </html>\n",
        lang = lang.code(),
        title = escape(title),
        site = escape(site_name),
    );
    out
}

const STYLE: &str = "body{font-family:monospace;max-width:48rem;margin:0 auto;padding:1rem;}\
header,footer{display:flex;justify-content:space-between;padding:1rem 0;}\
nav a{margin-left:1rem;}dt{font-weight:bold;}textarea,input{width:100%;}";
