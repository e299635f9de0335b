use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section};
use crate::page::{Container, ElementId, Page};
use crate::theme::Theme;

/// Lines taken by one rendered list item (heading, paragraph, button)
const ITEM_HEIGHT: u16 = 3;

struct PageAreas {
    info: Rect,
    tags: Rect,
    products: Rect,
    category: Rect,
    footer: Rect,
}

fn page_layout(area: Rect) -> PageAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Count / status line
            Constraint::Length(5), // Category tags
            Constraint::Min(4),    // Product lists
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    PageAreas {
        info: chunks[0],
        tags: chunks[1],
        products: body[0],
        category: body[1],
        footer: chunks[3],
    }
}

/// Lay tags out left to right, wrapping onto the next row when full.
/// Tags that do not fit in `inner` are left out.
fn tag_chips<'a>(inner: Rect, labels: impl Iterator<Item = &'a str>) -> Vec<Rect> {
    let mut chips = Vec::new();
    let (mut x, mut y) = (inner.x, inner.y);

    for label in labels {
        let width = (Span::raw(label).width() as u16 + 2).min(inner.width);
        if x > inner.x && x + width > inner.right() {
            x = inner.x;
            y += 1;
        }
        if y >= inner.bottom() || width == 0 {
            break;
        }
        chips.push(Rect::new(x, y, width, 1));
        x += width + 1;
    }
    chips
}

fn tags_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// Node index, within `#cat-tags`, of the tag drawn under the given terminal cell
pub fn tag_at(area: Rect, page: &Page, column: u16, row: u16) -> Option<usize> {
    let inner = tags_inner(page_layout(area).tags);
    let tags: Vec<_> = page.element(ElementId::CatTags).tags_indexed().collect();
    let chips = tag_chips(inner, tags.iter().map(|(_, t)| t.label.as_str()));

    tags.iter()
        .zip(chips)
        .find(|(_, chip)| column >= chip.x && column < chip.right() && row == chip.y)
        .map(|((index, _), _)| *index)
}

pub fn draw(f: &mut Frame, app: &App) {
    let areas = page_layout(f.area());
    let page = app.page.snapshot();
    let theme = &app.theme;

    draw_info_line(f, app, &page, areas.info);
    draw_tags_box(f, app, &page, areas.tags);
    draw_item_list(
        f,
        theme,
        page.element(ElementId::GaspiList),
        " Produits anti-gaspi ".to_string(),
        app.section == Section::Products,
        app.selected_product,
        areas.products,
    );
    let category_title = match &app.active_category {
        Some(category) => format!(" Catégorie : {} ", category),
        None => " Catégorie ".to_string(),
    };
    draw_item_list(
        f,
        theme,
        page.element(ElementId::CategorieList),
        category_title,
        app.section == Section::Category,
        app.selected_category_item,
        areas.category,
    );
    draw_footer(f, app, areas.footer);

    if app.popup == Popup::Help {
        draw_help_popup(f, theme);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, page: &Page, area: Rect) {
    let theme = &app.theme;
    let count = page.element(ElementId::GaspiCount).text_content();

    let mut spans = vec![
        Span::styled(
            if count.is_empty() { "-".to_string() } else { count },
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" produits anti-gaspi", Style::default().fg(theme.text)),
        Span::styled(" │ ", Style::default().fg(theme.text_dim)),
    ];

    // Priority: status message > loading > api base
    if let Some(ref status) = app.status_message {
        spans.push(Span::styled(status.as_str(), Style::default().fg(theme.accent)));
    } else if app.is_loading() {
        spans.push(Span::styled("Chargement…", Style::default().fg(theme.text_dim)));
    } else {
        spans.push(Span::styled(app.api_base.as_str(), Style::default().fg(theme.text_dim)));
    }

    let info = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn section_block<'a>(theme: &Theme, title: String, is_active: bool) -> Block<'a> {
    let border_color = if is_active { theme.accent } else { theme.inactive };
    let title_style = if is_active {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.inactive)
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

fn draw_tags_box(f: &mut Frame, app: &App, page: &Page, area: Rect) {
    let theme = &app.theme;
    let is_active = app.section == Section::Tags;
    let block = section_block(theme, " Catégories ".to_string(), is_active);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let tags = page.element(ElementId::CatTags);
    if tags.is_empty() {
        let empty = Paragraph::new("  Aucune catégorie").style(Style::default().fg(theme.text_dim));
        f.render_widget(empty, inner);
        return;
    }

    let chips = tag_chips(inner, tags.tags().map(|t| t.label.as_str()));
    for ((index, tag), chip) in tags.tags_indexed().zip(chips) {
        let style = if index == app.selected_tag && is_active {
            Style::default()
                .bg(theme.bg_selected)
                .fg(theme.tag)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.tag)
        };
        f.render_widget(Paragraph::new(format!(" {} ", tag.label)).style(style), chip);
    }
}

fn draw_item_list(
    f: &mut Frame,
    theme: &Theme,
    container: &Container,
    title: String,
    is_active: bool,
    selected: usize,
    area: Rect,
) {
    let block = section_block(theme, title, is_active);

    if container.is_empty() {
        let empty = Paragraph::new("  Aucun produit")
            .style(Style::default().fg(theme.text_dim))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in container.items().enumerate() {
        let row_style = if i == selected && is_active {
            Style::default().bg(theme.bg_selected)
        } else {
            Style::default()
        };

        lines.push(
            Line::from(Span::styled(
                item.heading.as_str(),
                Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
            ))
            .style(row_style),
        );
        lines.push(
            Line::from(Span::styled(item.paragraph.as_str(), Style::default().fg(theme.text_dim)))
                .style(row_style),
        );
        lines.push(
            Line::from(vec![
                Span::styled("[ ", Style::default().fg(theme.inactive)),
                Span::styled(item.button.label.as_str(), Style::default().fg(theme.accent)),
                Span::styled(" ]", Style::default().fg(theme.inactive)),
            ])
            .style(row_style),
        );
    }

    // Keep the selected item in view
    let inner_height = area.height.saturating_sub(2);
    let selected_bottom = (selected as u16 + 1).saturating_mul(ITEM_HEIGHT);
    let scroll = selected_bottom.saturating_sub(inner_height);

    let list = Paragraph::new(lines).block(block).scroll((scroll, 0));
    f.render_widget(list, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Tags => vec![
            ("←→", "Nav"),
            ("Enter", "Filter"),
            ("r", "Products"),
            ("R", "Reload"),
            ("Tab", "Next"),
            ("h", "Help"),
        ],
        Section::Products | Section::Category => vec![
            ("↑↓", "Nav"),
            ("r", "Products"),
            ("R", "Reload"),
            ("Tab", "Next"),
            ("h", "Help"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(theme.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        ))
    };
    let binding = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(theme.accent)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        heading("═══ Navigation ═══"),
        binding("  Tab        ", "Switch sections (Products → Tags → Category)"),
        binding("  ↑/↓ ←/→    ", "Move selection"),
        Line::from(""),
        heading("═══ Catalog ═══"),
        binding("  Enter      ", "Show products of the selected category"),
        binding("  Click      ", "Show products of the clicked category"),
        binding("  r          ", "Re-render the product list"),
        binding("  R          ", "Reload the whole catalog"),
        Line::from(""),
        binding("  q          ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(theme.text_dim)),
            Span::styled("h", Style::default().fg(theme.accent)),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::styled(" to close", Style::default().fg(theme.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" antigaspi Help ", Style::default().fg(theme.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
