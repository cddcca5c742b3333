//! Full pages: the landing page and the single-note page.

use maud::{Markup, html};
use nts_relay::{Event, RelayInfo};

use super::components::{format_timestamp, note_title, page_shell, truncate_npub_display};

/// Client-side libraries the note form relies on.
const HTMX_JS: &str = "https://unpkg.com/htmx.org@1.9.12";
const HTMX_JSON_ENC_JS: &str = "https://unpkg.com/htmx.org@1.9.12/dist/ext/json-enc.js";
const NOSTR_TOOLS_JS: &str = "https://unpkg.com/nostr-tools@2.7.0/lib/nostr.bundle.js";
const APP_JS: &str = "/static/js/scripts.js";

/// Render the landing page: relay metadata, the note form, and a list
/// that loads the visitor's notes via `/fetch-notes`.
pub fn home_page(title: &str, info: &RelayInfo, site_name: &str) -> Markup {
    let heading = if info.name.is_empty() {
        site_name
    } else {
        info.name.as_str()
    };
    let operator = info.npub();

    let body = html! {
        section class="relay-info" {
            h1 { (heading) }
            @if !info.description.is_empty() {
                p class="relay-description" { (info.description) }
            }
            @if let Some(npub) = &operator {
                p class="relay-operator" {
                    "Operated by "
                    span class="mono" title=(npub) { (truncate_npub_display(npub)) }
                }
            }
        }

        form id="save-note-form" class="note-form" hx-ext="json-enc"
            hx-post="/save-note" hx-target="#notes" hx-swap="afterbegin" {
            input id="note-title" name="title" type="text" placeholder="Title (optional)";
            textarea id="note-content" name="content" placeholder="Write a note to self..." {}
            div id="error-message" class="error hidden" {}
            button type="submit" { "Save note" }
        }

        div id="notes" hx-get="/fetch-notes" hx-trigger="load"
            hx-vals="js:{pubkey: getPubkey()}" {
            p class="empty-state" { "Loading notes..." }
        }

        script src=(HTMX_JS) {}
        script src=(HTMX_JSON_ENC_JS) {}
        script src=(NOSTR_TOOLS_JS) {}
        script src=(APP_JS) {}
    };

    page_shell(title, site_name, body)
}

/// Render a single note with its full content.
pub fn note_page(title: &str, note: &Event, site_name: &str) -> Markup {
    let author = note.author_npub();

    let body = html! {
        article class="note-page" {
            p class="back" { a href="/" { "← All notes" } }
            h1 { (note_title(note)) }
            div class="note-meta" {
                @if let Some(npub) = &author {
                    span class="mono" title=(npub) { (truncate_npub_display(npub)) }
                }
                @if let Some((display, iso)) = format_timestamp(note.created_at) {
                    time datetime=(iso) { (display) }
                }
            }
            div class="note-content" { (note.content) }
            div class="note-id" { "ID " code { (note.id) } }
        }
    };

    page_shell(title, site_name, body)
}
