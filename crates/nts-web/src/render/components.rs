//! Shared HTML components and display helpers.
//!
//! These are maud functions that return `Markup` fragments for composition
//! into full pages, plus the string helpers the templates use for titles,
//! previews and timestamps.

use std::borrow::Cow;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use nts_relay::Event;

/// Byte budget for note previews in cards and lists.
pub const PREVIEW_LEN: usize = 280;

/// Words taken from the content when a note has no title tag.
const TITLE_WORDS: usize = 10;

/// Character budget for generated titles.
const TITLE_MAX_CHARS: usize = 50;

/// Title shown when neither a tag nor the content yields one.
const UNTITLED: &str = "Untitled";

/// Inline CSS for all pages and fragments.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#fafafa;--fg:#111;--fg2:#555;--fg3:#999;--accent:#9900CC;--accent-hover:#7a00a3;--surface:#fff;--border:rgba(153,0,204,.15);--danger:#c0392b;--mono:"SF Mono",SFMono-Regular,ui-monospace,Menlo,monospace}
body{font-family:Inter,-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;line-height:1.6;color:var(--fg);background:var(--bg);min-height:100vh;display:flex;flex-direction:column;align-items:center;padding:1.5rem 1rem}
main{max-width:680px;width:100%;flex:1}
a{color:var(--accent);text-decoration:none}
a:hover{text-decoration:underline}
.mono{font-family:var(--mono);font-size:.8rem;color:var(--fg3)}
.hidden{display:none}

.relay-info{margin-bottom:1.5rem}
.relay-info h1{font-size:2rem;font-weight:800;letter-spacing:-.03em}
.relay-description{color:var(--fg2);margin-top:.25rem}
.relay-operator{color:var(--fg3);font-size:.85rem;margin-top:.25rem}

.note-form{display:flex;flex-direction:column;gap:.5rem;margin-bottom:2rem}
.note-form input,.note-form textarea{font:inherit;padding:.6rem .75rem;border:1px solid var(--border);border-radius:6px;background:var(--surface);color:var(--fg)}
.note-form textarea{min-height:120px;resize:vertical}
.note-form button{align-self:flex-end;padding:.55rem 1.1rem;background:var(--accent);color:#fff;border:none;border-radius:6px;font-size:.9rem;font-weight:500;cursor:pointer}
.note-form button:hover{background:var(--accent-hover)}
.error{color:var(--danger);font-size:.9rem}

.note-list{display:flex;flex-direction:column;gap:.75rem}
.note-card{padding:1rem 1.25rem;border:1px solid var(--border);border-radius:10px;background:var(--surface)}
.note-card .note-title{font-size:1.1rem;font-weight:600}
.note-card .note-title a{color:var(--fg)}
.note-card .note-title a:hover{color:var(--accent);text-decoration:none}
.note-preview{color:var(--fg2);white-space:pre-wrap;word-break:break-word;margin-top:.25rem}
.note-meta{display:flex;gap:1rem;align-items:center;margin-top:.5rem;font-size:.8rem;color:var(--fg3)}
.empty-state{color:var(--fg3);text-align:center;padding:2rem 0}

.note-page .back{font-size:.9rem;margin-bottom:1rem}
.note-page h1{font-size:1.6rem;font-weight:700;letter-spacing:-.01em;line-height:1.3}
.note-content{white-space:pre-wrap;word-break:break-word;font-size:1.05rem;line-height:1.75;margin-top:1.25rem}
.note-id{margin-top:1.5rem;font-size:.8rem;color:var(--fg3);word-break:break-all}

.footer{text-align:center;margin-top:1rem;padding-top:.75rem;font-size:.8rem;color:var(--fg3);width:100%;max-width:680px}

@media(prefers-color-scheme:dark){
:root{--bg:#0a0a0f;--fg:#e5e5e5;--fg2:#a0a0a0;--fg3:#666;--accent:#d946ef;--accent-hover:#e879f9;--surface:#111118;--border:rgba(191,0,255,.2)}
}
"#;

/// Render the full HTML page shell shared by every full page.
pub fn page_shell(title: &str, site_name: &str, body_content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · " (site_name) }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                main { (body_content) }
                footer class="footer" {
                    (site_name) " · notes stored on Nostr"
                }
            }
        }
    }
}

/// Render one note as a card linking to its page.
pub fn note_card(note: &Event) -> Markup {
    html! {
        article class="note-card" id={ "note-" (note.id) } {
            h3 class="note-title" {
                a href={ "/note/" (note.id) } { (note_title(note)) }
            }
            p class="note-preview" { (truncate(&note.content, PREVIEW_LEN)) }
            (note_meta(note))
        }
    }
}

/// Render a list of note cards, or an empty-state message.
pub fn note_list(notes: &[Event]) -> Markup {
    html! {
        @if notes.is_empty() {
            p class="empty-state" { "No notes yet." }
        } @else {
            div class="note-list" {
                @for note in notes {
                    (note_card(note))
                }
            }
        }
    }
}

/// Timestamp line under a note.
pub fn note_meta(note: &Event) -> Markup {
    html! {
        div class="note-meta" {
            @if let Some((display, iso)) = format_timestamp(note.created_at) {
                time datetime=(iso) { (display) }
            }
        }
    }
}

/// Display title for a note: its `title` tag, else a title generated from
/// the content, else "Untitled".
pub fn note_title(note: &Event) -> Cow<'_, str> {
    if let Some(title) = note.title().map(str::trim).filter(|t| !t.is_empty()) {
        return Cow::Borrowed(title);
    }
    let generated = generate_title(&note.content);
    if generated.is_empty() {
        Cow::Borrowed(UNTITLED)
    } else {
        Cow::Owned(generated)
    }
}

/// Build a title from the first words of `content`.
///
/// Markup-like `<...>` runs are dropped, the first ten words are kept, and
/// anything over fifty characters is cut back to the last whole word and
/// suffixed with "...".
pub fn generate_title(content: &str) -> String {
    let clean = strip_tags(content);
    let title = clean
        .split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    if title.chars().count() <= TITLE_MAX_CHARS {
        return title;
    }

    let end = title
        .char_indices()
        .nth(TITLE_MAX_CHARS)
        .map_or(title.len(), |(i, _)| i);
    let cut = title[..end].trim_end();
    let cut = match cut.rfind(' ') {
        Some(space) if space > 0 => &cut[..space],
        _ => cut,
    };
    format!("{cut}...")
}

/// Remove `<...>` runs. An unterminated `<` is kept as text.
fn strip_tags(s: &str) -> Cow<'_, str> {
    if !s.contains('<') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Format a timestamp as "Jan 2, 2006 15:04" (UTC) plus its ISO-8601 form.
/// Returns None if created_at is 0 (missing) or out of range.
pub fn format_timestamp(created_at: u64) -> Option<(String, String)> {
    if created_at == 0 {
        return None;
    }

    let secs = i64::try_from(created_at).ok()?;
    let ts = chrono::DateTime::from_timestamp(secs, 0)?;
    let display = ts.format("%b %-d, %Y %H:%M").to_string();
    let iso = ts.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    Some((display, iso))
}

/// Truncate a string to a maximum length, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Truncate an npub for display: first 16 chars + ... + last 12 chars.
pub fn truncate_npub_display(npub: &str) -> String {
    if npub.len() <= 32 || !npub.is_ascii() {
        return npub.to_string();
    }
    format!("{}...{}", &npub[..16], &npub[npub.len() - 12..])
}
