//! Page rendering.

use crate::html::{escape, layout};
use crate::lang::Lang;
use crate::resume::{Link, Resume};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Write;
use website_common::config::SiteConfig;

/// Every page served by the site
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Info,
    Contact,
    ContactSuccess,
    Resume(Lang),
    Legal,
}

impl Page {
    pub const ALL: [Self; 7] = [
        Self::Home,
        Self::Info,
        Self::Contact,
        Self::ContactSuccess,
        Self::Resume(Lang::English),
        Self::Resume(Lang::French),
        Self::Legal,
    ];

    /// URL path the page is served at.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Info => "/info",
            Self::Contact => "/contact",
            Self::ContactSuccess => "/contact_success",
            Self::Resume(Lang::English) => "/resume",
            Self::Resume(Lang::French) => "/resume/fr",
            Self::Legal => "/legal",
        }
    }

    const fn lang(self) -> Lang {
        match self {
            Self::Resume(lang) => lang,
            _ => Lang::English,
        }
    }
}

/// Render `page` to a complete HTML document.
///
/// `max_message_length` is the contact message limit, in bytes, enforced by
/// the server and mirrored by the form.
#[must_use]
pub fn render_page(page: Page, site: &SiteConfig, resume: &Resume, max_message_length: usize) -> String {
    let (title, body) = match page {
        Page::Home => ("Home", home_body(site, resume)),
        Page::Info => ("Info", info_body(site)),
        Page::Contact => ("Contact", contact_body(site, max_message_length)),
        Page::ContactSuccess => ("Message sent", contact_success_body()),
        Page::Resume(lang) => ("Resume", resume_body(lang, site, resume)),
        Page::Legal => ("Legal", legal_body(site)),
    };
    layout(page.lang(), title, &site.name, &body)
}

/// Render the error page shown for failed requests.
#[must_use]
pub fn render_error_page(site_name: &str, status: u16, reason: &str, message: &str) -> String {
    let body = format!(
        "<h1>{status} {}</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to home</a></p>",
        escape(reason),
        escape(message)
    );
    layout(Lang::English, &format!("Error {status}"), site_name, &body)
}

/// All pages, rendered once.
#[derive(Clone, Debug)]
pub struct Pages {
    by_path: HashMap<&'static str, Bytes>,
}

impl Pages {
    #[must_use]
    pub fn prerender(site: &SiteConfig, resume: &Resume, max_message_length: usize) -> Self {
        let by_path = Page::ALL
            .into_iter()
            .map(|page| {
                let html = render_page(page, site, resume, max_message_length);
                (page.path(), Bytes::from(html))
            })
            .collect();
        Self { by_path }
    }

    /// Rendered page served at `path`, if any.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.by_path.get(path).cloned()
    }
}

fn home_body(site: &SiteConfig, resume: &Resume) -> String {
    format!(
        "<h1>{}</h1>\n<p>{}</p>\n<ul>\n\
         <li><a href=\"/resume\">Resume</a> (<a href=\"/resume/fr\">français</a>)</li>\n\
         <li><a href=\"/contact\">Get in touch</a></li>\n</ul>",
        escape(&site.name),
        escape(resume.tagline.get(Lang::English))
    )
}

fn info_body(site: &SiteConfig) -> String {
    let mut out = format!(
        "<h1>Info</h1>\n<p>This website is a small server keeping track of visits \
         and sending periodic traffic reports to {}.</p>",
        escape(&site.name)
    );
    if !site.source_code_url.is_empty() {
        let url = escape(&site.source_code_url);
        let _ = write!(out, "\n<p>Source code: <a href=\"{url}\">{url}</a></p>");
    }
    out
}

fn contact_body(site: &SiteConfig, max_message_length: usize) -> String {
    format!(
        "<h1>Contact</h1>\n\
         <p>Write to <a href=\"mailto:{email}\">{email}</a> or use the form below.</p>\n\
         <form id=\"form\" method=\"post\" action=\"/contact\">\n\
         <label for=\"email_address\">Your email address</label>\n\
         <input id=\"email_address\" name=\"email_address\" type=\"email\" required>\n\
         <label for=\"message\">Message</label>\n\
         <textarea id=\"message\" name=\"message\" rows=\"8\" maxlength=\"{max_message_length}\" required></textarea>\n\
         <button type=\"submit\">Send</button>\n\
         </form>",
        email = escape(&site.contact_email),
    )
}

fn contact_success_body() -> String {
    "<h1>Thank you!</h1>\n<p>Your message was sent. A confirmation has been emailed to you.</p>"
        .to_string()
}

fn legal_body(site: &SiteConfig) -> String {
    format!(
        "<h1>Legal notice</h1>\n\
         <p>Publisher: {name}. Contact: <a href=\"mailto:{email}\">{email}</a>.</p>\n\
         <h2>Analytics</h2>\n\
         <p>Each request is logged with its URL, user agent and IP address. \
         Visitors are identified by a <code>visitor_id</code> cookie or by a hash of \
         their IP address and user agent. Contact form messages are kept to answer them.</p>",
        name = escape(&site.name),
        email = escape(&site.contact_email)
    )
}

fn resume_body(lang: Lang, site: &SiteConfig, resume: &Resume) -> String {
    let labels = &resume.labels;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<h1>{}</h1>\n<p>{}</p>",
        escape(&site.name),
        escape(resume.tagline.get(lang))
    );

    let _ = writeln!(out, "<h2>{}</h2>", escape(labels.experiences.get(lang)));
    for exp in &resume.experiences {
        let _ = writeln!(out, "<h3>{}</h3>\n<dl>", escape(exp.title.get(lang)));
        let rows = [
            (labels.duration, exp.period(lang, labels)),
            (labels.company, exp.company.to_string()),
            (labels.location, exp.location.to_string()),
            (labels.technologies, exp.skills_and_tools.join(", ")),
            (labels.description, exp.description.get(lang).to_string()),
        ];
        for (key, value) in rows {
            let _ = writeln!(
                out,
                "<dt>{}</dt><dd>{}</dd>",
                escape(key.get(lang)),
                escape(&value)
            );
        }
        out.push_str("</dl>\n");
    }

    let _ = writeln!(out, "<h2>{}</h2>\n<dl>", escape(labels.skills.get(lang)));
    for skill in &resume.skills {
        let _ = writeln!(
            out,
            "<dt>{}</dt><dd>{}</dd>",
            escape(skill.title.get(lang)),
            escape(&skill.tools.join(", "))
        );
    }
    out.push_str("</dl>\n");

    let _ = writeln!(out, "<h2>{}</h2>\n<dl>", escape(labels.languages.get(lang)));
    for spoken in &resume.languages {
        let _ = writeln!(
            out,
            "<dt>{}</dt><dd>{}</dd>",
            escape(spoken.name.get(lang)),
            escape(spoken.level.get(lang))
        );
    }
    out.push_str("</dl>\n");

    let _ = writeln!(out, "<h2>{}</h2>", escape(labels.external_links.get(lang)));
    write_links(&mut out, lang, &resume.external_links);

    let _ = writeln!(out, "<h2>{}</h2>", escape(labels.contact.get(lang)));
    let email = escape(&site.contact_email);
    let _ = writeln!(out, "<p><a href=\"mailto:{email}\">{email}</a></p>");
    write_links(&mut out, lang, &resume.contact_links);
    out
}

fn write_links(out: &mut String, lang: Lang, links: &[Link]) {
    out.push_str("<ul>\n");
    for link in links {
        let _ = writeln!(
            out,
            "<li>{}: <a href=\"{}\">{}</a></li>",
            escape(link.label.get(lang)),
            escape(link.url),
            escape(link.display_text())
        );
    }
    out.push_str("</ul>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            name: "Jane <Doe>".into(),
            domain: "example.com".into(),
            contact_email: "jane@example.com".into(),
            source_code_url: "https://example.com/src".into(),
        }
    }

    #[test]
    fn test_prerender_covers_every_page() {
        let pages = Pages::prerender(&site(), &Resume::published(), 8000);
        for page in Page::ALL {
            let html = pages.get(page.path()).unwrap();
            assert!(html.starts_with(b"<!DOCTYPE html>"), "{}", page.path());
        }
        assert!(pages.get("/resume.pdf").is_none());
    }

    #[test]
    fn test_site_name_is_escaped() {
        let html = render_page(Page::Home, &site(), &Resume::published(), 8000);
        assert!(html.contains("<h1>Jane &lt;Doe&gt;</h1>"));
        assert!(!html.contains("<Doe>"));
    }

    #[test]
    fn test_resume_is_localized() {
        let resume = Resume::published();
        let en = render_page(Page::Resume(Lang::English), &site(), &resume, 8000);
        let fr = render_page(Page::Resume(Lang::French), &site(), &resume, 8000);
        assert!(en.contains("<html lang=\"en\">"));
        assert!(en.contains("<h2>Work experience</h2>"));
        assert!(en.contains("01/2022 - 10/2022 (9 months)"));
        assert!(fr.contains("<html lang=\"fr\">"));
        assert!(fr.contains("<h2>Expériences</h2>"));
        assert!(fr.contains("01/2023 - maintenant"));
    }

    #[test]
    fn test_contact_form_fields() {
        let html = render_page(Page::Contact, &site(), &Resume::published(), 1234);
        assert!(html.contains("action=\"/contact\""));
        assert!(html.contains("maxlength=\"1234\""));
        assert!(html.contains("name=\"email_address\""));
        assert!(html.contains("name=\"message\""));
    }

    #[test]
    fn test_error_page() {
        let html = render_error_page("Jane", 400, "Bad Request", "<script>");
        assert!(html.contains("<h1>400 Bad Request</h1>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<title>Error 400 - Jane</title>"));
    }
}
