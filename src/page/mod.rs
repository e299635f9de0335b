//! In-memory page model
//!
//! The page is a fixed set of containers addressed by [`ElementId`]. Render
//! operations clear a container and append nodes to it; the terminal UI only
//! reads from it.

pub mod events;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use events::ClickHandler;

/// Label of the action button on every list item
pub const BUY_LABEL: &str = "Acheter";

/// Style class carried by category tags
pub const TAG_CLASS: &str = "tag";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    GaspiCount,
    GaspiList,
    CatTags,
    CategorieList,
}

impl ElementId {
    pub const ALL: [ElementId; 4] = [
        ElementId::GaspiCount,
        ElementId::GaspiList,
        ElementId::CatTags,
        ElementId::CategorieList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::GaspiCount => "gaspi-count",
            ElementId::GaspiList => "gaspi-list",
            ElementId::CatTags => "cat-tags",
            ElementId::CategorieList => "categorie-list",
        }
    }

    fn index(&self) -> usize {
        match self {
            ElementId::GaspiCount => 0,
            ElementId::GaspiList => 1,
            ElementId::CatTags => 2,
            ElementId::CategorieList => 3,
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub on_click: Option<ClickHandler>,
}

/// Heading, paragraph and action button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub heading: String,
    pub paragraph: String,
    pub button: Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub label: String,
    pub class: &'static str,
    pub on_click: Option<ClickHandler>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Item(ListItem),
    Tag(Tag),
}

impl Node {
    /// Concatenated text of the node and its children
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Item(item) => format!("{}{}{}", item.heading, item.paragraph, item.button.label),
            Node::Tag(tag) => tag.label.clone(),
        }
    }

    pub fn on_click(&self) -> Option<ClickHandler> {
        match self {
            Node::Text(_) => None,
            Node::Item(item) => item.button.on_click,
            Node::Tag(tag) => tag.on_click,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    nodes: Vec<Node>,
}

impl Container {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Remove every child
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn append(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.nodes.clear();
        self.nodes.push(Node::Text(text.into()));
    }

    pub fn items(&self) -> impl Iterator<Item = &ListItem> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Item(item) => Some(item),
            _ => None,
        })
    }

    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags_indexed().map(|(_, tag)| tag)
    }

    /// Tags paired with their position among all children
    pub fn tags_indexed(&self) -> impl Iterator<Item = (usize, &Tag)> {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match n {
            Node::Tag(tag) => Some((i, tag)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    containers: [Container; 4],
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, id: ElementId) -> &Container {
        &self.containers[id.index()]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Container {
        &mut self.containers[id.index()]
    }

    /// Indented text dump of every container
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for id in ElementId::ALL {
            let container = self.element(id);
            out.push_str(&format!("#{} ({})\n", id, container.len()));
            for node in container.nodes() {
                match node {
                    Node::Text(text) => out.push_str(&format!("  {}\n", text)),
                    Node::Item(item) => {
                        out.push_str(&format!("  - {}\n", item.heading));
                        if !item.paragraph.is_empty() {
                            out.push_str(&format!("    {}\n", item.paragraph));
                        }
                        out.push_str(&format!("    [{}]\n", item.button.label));
                    }
                    Node::Tag(tag) => out.push_str(&format!("  <{}> {}\n", tag.class, tag.label)),
                }
            }
        }
        out
    }
}

/// Page shared between the UI and render tasks.
/// The lock is only held for synchronous mutation, never across an await.
#[derive(Debug, Clone)]
pub struct SharedPage(Arc<Mutex<Page>>);

impl SharedPage {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Page::new())))
    }

    pub fn lock(&self) -> MutexGuard<'_, Page> {
        // Page is plain data, a poisoned lock is still usable
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` against one container
    pub fn with_element<R>(&self, id: ElementId, f: impl FnOnce(&mut Container) -> R) -> R {
        let mut page = self.lock();
        f(page.element_mut(id))
    }

    pub fn snapshot(&self) -> Page {
        self.lock().clone()
    }
}

impl Default for SharedPage {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a list item (heading, paragraph, buy button) and append it to `container`
pub fn create_li(container: &mut Container, title: &str, description: &str) {
    container.append(Node::Item(ListItem {
        heading: title.to_string(),
        paragraph: description.to_string(),
        button: Button {
            label: BUY_LABEL.to_string(),
            on_click: None,
        },
    }));
}
