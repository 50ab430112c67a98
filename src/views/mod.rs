//! HTML pages. Pure functions from already-validated data to markup.

use crate::storage::Record;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

/// A one-shot message shown at the top of the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub message: String,
    pub kind: FlashKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("success") => Self::Success,
            Some("error") => Self::Error,
            _ => Self::Info,
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash flash-success",
            Self::Error => "flash flash-error",
            Self::Info => "flash flash-info",
        }
    }
}

const STYLE: &str = "body{font-family:sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}td,th{border:1px solid #ccc;padding:.4rem;text-align:left}\
.flash{padding:.6rem;margin-bottom:1rem}.flash-success{background:#dfd}.flash-error{background:#fdd}\
.flash-info{background:#eef}form.inline{display:inline}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        encode_text(title)
    )
}

/// The record listing. Admin controls are rendered only for an authenticated `username`.
#[must_use]
pub fn index_page(records: &[Record], username: Option<&str>, flash: Option<&Flash>) -> String {
    let mut body = String::new();
    body.push_str("<header>\n<h1>Database Viewer</h1>\n");
    match username {
        Some(name) => {
            let _ = writeln!(
                body,
                "<p>Signed in as <strong>{}</strong></p>\n\
                 <form method=\"post\" action=\"/admin/logout\"><button type=\"submit\">Log out</button></form>",
                encode_text(name)
            );
        }
        None => body.push_str("<p><a href=\"/admin/login\">Admin login</a></p>\n"),
    }
    body.push_str("</header>\n");

    if let Some(flash) = flash {
        let _ = writeln!(
            body,
            "<div class=\"{}\">{}</div>",
            flash.kind.css_class(),
            encode_text(&flash.message)
        );
    }

    if username.is_some() {
        body.push_str(
            "<section>\n<h2>New entry</h2>\n<form method=\"post\" action=\"/data\">\n\
             <input name=\"title\" placeholder=\"Title\" required>\n\
             <input name=\"description\" placeholder=\"Description\">\n\
             <button type=\"submit\">Create</button>\n</form>\n</section>\n",
        );
    }

    if records.is_empty() {
        body.push_str("<p>No entries yet.</p>\n");
    } else {
        body.push_str(
            "<table>\n<thead><tr><th>ID</th><th>Title</th><th>Description</th><th>Created</th>",
        );
        if username.is_some() {
            body.push_str("<th>Actions</th>");
        }
        body.push_str("</tr></thead>\n<tbody>\n");
        for record in records {
            render_row(&mut body, record, username.is_some());
        }
        body.push_str("</tbody>\n</table>\n");
    }

    if username.is_some() {
        body.push_str(
            "<script>\nfunction deleteEntry(id){if(!confirm('Delete entry '+id+'?'))return;\
             fetch('/data/'+id,{method:'DELETE'}).then(r=>{window.location='/?message='+\
             (r.ok?'Entry%20deleted%20successfully&message_type=success':'Delete%20failed&message_type=error');});}\n</script>\n",
        );
    }

    layout("Database Viewer", &body)
}

fn render_row(body: &mut String, record: &Record, is_admin: bool) {
    let description = record.description.as_deref().unwrap_or_default();
    let _ = write!(
        body,
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
        record.id,
        encode_text(&record.title),
        encode_text(description),
        encode_text(&record.created_at)
    );
    if is_admin {
        let _ = write!(
            body,
            "<td><form class=\"inline\" method=\"post\" action=\"/data/{id}\">\
             <input name=\"title\" value=\"{title}\" required>\
             <input name=\"description\" value=\"{description}\">\
             <button type=\"submit\">Save</button></form> \
             <button type=\"button\" onclick=\"deleteEntry({id})\">Delete</button></td>",
            id = record.id,
            title = encode_double_quoted_attribute(&record.title),
            description = encode_double_quoted_attribute(description),
        );
    }
    body.push_str("</tr>\n");
}

/// The admin login form, with an optional generic error.
#[must_use]
pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::from("<h1>Admin login</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(
            body,
            "<div class=\"flash flash-error\">{}</div>",
            encode_text(error)
        );
    }
    body.push_str(
        "<form method=\"post\" action=\"/admin/login\">\n\
         <label>Username <input name=\"username\" autocomplete=\"username\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" autocomplete=\"current-password\" required></label>\n\
         <button type=\"submit\">Log in</button>\n</form>\n<p><a href=\"/\">Back</a></p>\n",
    );
    layout("Admin login", &body)
}
