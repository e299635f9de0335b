mod api;
mod app;
mod config;
mod load;
mod page;
mod render;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::CatalogClient;
use app::{App, Popup};
use config::{AppConfig, Overrides, ResolvedConfig};
use page::events::ClickEvent;
use page::{ElementId, SharedPage};

#[derive(Parser, Debug)]
#[command(name = "antigaspi")]
#[command(version = "0.1.0")]
#[command(about = "Browse the anti-waste product catalog from the terminal")]
struct Args {
    /// Base URL of the catalog API
    #[arg(long)]
    api_base: Option<String>,

    /// Catalog endpoint path
    #[arg(long)]
    endpoint: Option<String>,

    /// Config file (defaults to ~/.config/antigaspi/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the number of anti-waste products and exit
    #[arg(long)]
    count: bool,

    /// Load the page once and print it
    #[arg(long)]
    dump: bool,

    /// Print the products of one category and exit
    #[arg(long)]
    category: Option<String>,
}

impl Args {
    fn is_headless(&self) -> bool {
        self.count || self.dump || self.category.is_some()
    }
}

/// Headless runs log to stderr. The TUI owns the terminal, so it logs to
/// `--log-file` or nowhere.
fn init_logging(args: &Args) -> Result<()> {
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::from_default_env());

    if let Some(path) = &args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else if args.is_headless() {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    // Resolved once, passed down from here
    let config = AppConfig::load(args.config.as_deref()).resolve(Overrides {
        api_base: args.api_base.clone(),
        endpoint: args.endpoint.clone(),
    });

    // Handle CLI-only commands
    if args.count {
        return print_count(&config).await;
    }

    if let Some(category) = &args.category {
        return print_category(&config, category).await;
    }

    if args.dump {
        return dump_page(&config).await;
    }

    // Run TUI
    run_tui(&config).await
}

async fn print_count(config: &ResolvedConfig) -> Result<()> {
    let client = CatalogClient::new(config)?;
    let count = render::product_left(&client).await?;
    println!("{}", count);
    Ok(())
}

async fn print_category(config: &ResolvedConfig, category: &str) -> Result<()> {
    let client = CatalogClient::new(config)?;
    let page = SharedPage::new();
    let event = ClickEvent {
        target: ElementId::CatTags,
        index: 0,
        text: category.to_string(),
    };

    render::display_category(&client, &page, &event).await?;

    let page = page.snapshot();
    for item in page.element(ElementId::CategorieList).items() {
        println!("{}\t{}", item.heading, item.paragraph);
    }
    Ok(())
}

async fn dump_page(config: &ResolvedConfig) -> Result<()> {
    let client = Arc::new(CatalogClient::new(config)?);
    let page = SharedPage::new();

    let mut tasks = load::TaskGroup::new();
    load::spawn_page_load(&mut tasks, client, page.clone());
    load::join_all(tasks).await;

    print!("{}", page.snapshot().to_text());
    Ok(())
}

async fn run_tui(config: &ResolvedConfig) -> Result<()> {
    // Create app state before touching the terminal
    let mut app = App::new(config)?;
    app.load_page();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll on a blocking thread so render tasks keep running meanwhile
        let ready = tokio::task::spawn_blocking(|| event::poll(std::time::Duration::from_millis(100))).await??;
        if ready {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    _ => {
                        if let Err(e) = app.handle_key(key) {
                            tracing::error!("Key handling failed: {:#}", e);
                        }
                    }
                },
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    app.handle_mouse(mouse, Rect::new(0, 0, size.width, size.height));
                }
                _ => {}
            }
        }

        app.tick();
    }
}
