//! HTML rendering for notes and pages.
//!
//! Handlers never build markup themselves: they hand a [`View`] to the
//! [`Renderer`] held in application state. The production renderer,
//! [`Templates`], uses [maud](https://maud.lambda.xyz/) for compile-time HTML
//! generation with automatic escaping of all dynamic values.

pub mod components;
pub mod pages;

use maud::Markup;
use nts_relay::{Event, RelayInfo};

/// A named view together with the data it renders.
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    /// Landing page with the note form and relay metadata.
    HomePage { title: &'a str, info: &'a RelayInfo },
    /// Full page for a single note.
    NotePage { title: &'a str, note: &'a Event },
    /// Fragment listing notes, newest first.
    NoteList(&'a [Event]),
    /// Fragment for one note, returned after a save.
    NoteCard(&'a Event),
}

impl View<'_> {
    /// Registered view name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::HomePage { .. } => "home_page",
            Self::NotePage { .. } => "note_page",
            Self::NoteList(_) => "note_list",
            Self::NoteCard(_) => "note_card",
        }
    }
}

/// Rendering failure.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The renderer has no template for this view.
    #[error("no template registered for view {0}")]
    UnknownView(&'static str),

    /// The template could not be produced from the given data.
    #[error("failed to render {view}: {reason}")]
    Failed {
        view: &'static str,
        reason: String,
    },
}

/// Turns views into HTML. Built once at start-up and shared read-only.
pub trait Renderer: Send + Sync + 'static {
    /// Render a view.
    fn render(&self, view: &View<'_>) -> Result<Markup, RenderError>;
}

/// Production renderer backed by maud templates.
#[derive(Debug, Clone)]
pub struct Templates {
    site_name: String,
}

impl Templates {
    /// Build the template set for a site.
    pub fn new(site_name: impl Into<String>) -> Self {
        let site_name = site_name.into();
        tracing::debug!(site_name = %site_name, "templates initialized");
        Self { site_name }
    }

    /// Site name used in page titles.
    pub fn site_name(&self) -> &str {
        &self.site_name
    }
}

impl Renderer for Templates {
    fn render(&self, view: &View<'_>) -> Result<Markup, RenderError> {
        let markup = match *view {
            View::HomePage { title, info } => pages::home_page(title, info, &self.site_name),
            View::NotePage { title, note } => pages::note_page(title, note, &self.site_name),
            View::NoteList(notes) => components::note_list(notes),
            View::NoteCard(note) => components::note_card(note),
        };
        Ok(markup)
    }
}
