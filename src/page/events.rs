//! Click dispatch
//!
//! Nodes register a [`ClickHandler`] when they are created. Dispatching a
//! click looks the node up, builds a typed [`ClickEvent`] from it and maps the
//! handler to a [`Command`] for the app to run.

use super::{ElementId, Page};

/// Handlers a node can register for clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickHandler {
    /// Show the products of the category named by the node's text
    FilterByCategory,
}

/// Payload handed to a click handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: ElementId,
    pub index: usize,
    /// Text content of the clicked node
    pub text: String,
}

/// Work the app should start in response to a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ShowCategory(ClickEvent),
}

/// Resolve a click on the `index`-th child of `target`.
/// Returns `None` when there is no such node or it has no handler.
pub fn dispatch(page: &Page, target: ElementId, index: usize) -> Option<Command> {
    let node = page.element(target).get(index)?;
    let handler = node.on_click()?;

    let event = ClickEvent {
        target,
        index,
        text: node.text_content(),
    };

    match handler {
        ClickHandler::FilterByCategory => Some(Command::ShowCategory(event)),
    }
}
