use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::sync::Arc;
use std::time::Instant;

use crate::api::CatalogClient;
use crate::config::ResolvedConfig;
use crate::load::{self, TaskGroup};
use crate::page::events::{dispatch, Command};
use crate::page::{ElementId, SharedPage};
use crate::theme::Theme;

/// Status messages clear after this many seconds
const STATUS_SECONDS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Products,
    Tags,
    Category,
}

impl Section {
    /// Container shown in this section
    pub fn element(&self) -> ElementId {
        match self {
            Section::Products => ElementId::GaspiList,
            Section::Tags => ElementId::CatTags,
            Section::Category => ElementId::CategorieList,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    pub page: SharedPage,
    pub client: Arc<CatalogClient>,
    pub theme: Theme,
    pub api_base: String,

    // Selection per section
    pub selected_product: usize,
    pub selected_tag: usize,
    pub selected_category_item: usize,

    // Category currently shown in the filtered list
    pub active_category: Option<String>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    // Render tasks still running
    pub tasks: TaskGroup,
}

impl App {
    pub fn new(config: &ResolvedConfig) -> Result<Self> {
        let client = Arc::new(CatalogClient::new(config)?);

        Ok(Self {
            section: Section::Tags,
            popup: Popup::None,

            page: SharedPage::new(),
            client,
            theme: Theme::from_config(&config.theme),
            api_base: config.api_base.clone(),

            selected_product: 0,
            selected_tag: 0,
            selected_category_item: 0,

            active_category: None,

            status_message: None,
            status_message_time: None,

            tasks: TaskGroup::new(),
        })
    }

    /// Kick off the page-load task group
    pub fn load_page(&mut self) {
        tracing::info!("Loading catalog from {}", self.client.catalog_url());
        // Tasks from a previous load keep running, nothing cancels them
        load::spawn_page_load(&mut self.tasks, self.client.clone(), self.page.clone());
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn is_loading(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup == Popup::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => {
                self.section = match self.section {
                    Section::Products => Section::Tags,
                    Section::Tags => Section::Category,
                    Section::Category => Section::Products,
                };
            }
            KeyCode::BackTab => {
                self.section = match self.section {
                    Section::Products => Section::Category,
                    Section::Tags => Section::Products,
                    Section::Category => Section::Tags,
                };
            }

            KeyCode::Char('j') | KeyCode::Down | KeyCode::Right | KeyCode::Char('l') => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::Left => self.move_up(),

            KeyCode::Char(' ') | KeyCode::Enter => {
                let index = self.selected_index();
                self.click(self.section.element(), index);
            }

            // Re-render the product list
            KeyCode::Char('r') => {
                load::spawn_products(&mut self.tasks, self.client.clone(), self.page.clone());
                self.set_status("Refreshing products");
            }

            // Reload everything
            KeyCode::Char('R') => {
                self.load_page();
                self.active_category = None;
                self.set_status("Reloading catalog");
            }

            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    /// Left click on a tag selects and activates it
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if self.popup != Popup::None {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let hit = crate::ui::tag_at(area, &self.page.lock(), mouse.column, mouse.row);
            if let Some(index) = hit {
                self.section = Section::Tags;
                self.selected_tag = index;
                self.click(ElementId::CatTags, index);
            }
        }
    }

    /// Dispatch a click on the `index`-th child of `target`
    pub fn click(&mut self, target: ElementId, index: usize) {
        let command = dispatch(&self.page.lock(), target, index);

        if let Some(Command::ShowCategory(event)) = command {
            let category = event.text.trim().to_string();
            self.set_status(format!("Catégorie : {}", category));
            self.active_category = Some(category);
            self.selected_category_item = 0;
            load::spawn_category(&mut self.tasks, self.client.clone(), self.page.clone(), event);
        }
    }

    fn selected_index(&self) -> usize {
        match self.section {
            Section::Products => self.selected_product,
            Section::Tags => self.selected_tag,
            Section::Category => self.selected_category_item,
        }
    }

    fn selected_mut(&mut self) -> &mut usize {
        match self.section {
            Section::Products => &mut self.selected_product,
            Section::Tags => &mut self.selected_tag,
            Section::Category => &mut self.selected_category_item,
        }
    }

    fn section_len(&self) -> usize {
        self.page.lock().element(self.section.element()).len()
    }

    fn move_down(&mut self) {
        let len = self.section_len();
        let selected = self.selected_mut();
        if len > 0 && *selected + 1 < len {
            *selected += 1;
        }
    }

    fn move_up(&mut self) {
        let selected = self.selected_mut();
        *selected = selected.saturating_sub(1);
    }

    /// Drain finished tasks, expire the status line, keep selections in range
    pub fn tick(&mut self) {
        load::drain(&mut self.tasks);

        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_SECONDS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }

        let page = self.page.snapshot();
        let clamp = |selected: &mut usize, id: ElementId| {
            let len = page.element(id).len();
            if *selected >= len {
                *selected = len.saturating_sub(1);
            }
        };
        clamp(&mut self.selected_product, ElementId::GaspiList);
        clamp(&mut self.selected_tag, ElementId::CatTags);
        clamp(&mut self.selected_category_item, ElementId::CategorieList);
    }
}
