//! Main entry point for the schedule-watcher CLI application.

use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info, warn};
use ratatui::prelude::*;
use schedule_watcher::api::fetch_schedule;
use schedule_watcher::config::Config;
use schedule_watcher::pipeline::{SortDirection, SortKey, ingest, render_view};
use schedule_watcher::tui::{Action, App, draw, plain_text, poll_event};
use std::io::{self, stdout};
use std::time::Duration;

/// Command-line arguments for the schedule-watcher application.
#[derive(Parser, Debug)]
#[command(
    name = "schedule-watcher",
    version,
    about = "Browse upcoming TV episodes in the terminal",
    long_about = "Fetch the TVmaze schedule, filter it by type, language, network and \
                  streaming service, and page through the upcoming episodes."
)]
struct Args {
    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Schedule feed to fetch (overrides config)
    #[arg(short, long)]
    feed_url: Option<String>,

    /// Sort key: date, episodeName or showName (overrides config)
    #[arg(short, long)]
    sort: Option<SortKey>,

    /// Sort direction: asc or desc (overrides config)
    #[arg(short, long)]
    direction: Option<SortDirection>,

    /// Episodes per page (overrides config)
    #[arg(short, long)]
    page_size: Option<usize>,

    /// Print one page to stdout instead of starting the TUI
    #[arg(long, value_name = "PAGE")]
    print: Option<usize>,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

/// Initialize the terminal for TUI mode.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    if args.init_config {
        let path = Config::create_default_if_missing()?;
        println!("Config file: {}", path.display());
        return Ok(());
    }

    // Load config
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args
    if let Some(url) = args.feed_url {
        config.feed_url = url;
    }
    if let Some(sort_key) = args.sort {
        config.sort_key = sort_key;
    }
    if let Some(direction) = args.direction {
        config.sort_direction = direction;
    }
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            eprintln!("Error: --page-size must be at least 1.");
            std::process::exit(1);
        }
        config.page_size = page_size;
    }

    info!("Using schedule feed: {}", config.feed_url);

    if let Some(page) = args.print {
        let episodes = fetch_schedule(&config.feed_url, config.request_timeout()).await?;
        let schedule = ingest(episodes, Utc::now());
        let view = config.initial_view().with_page(page);
        let page_view = render_view(&schedule.episodes, &schedule.filters, &view);
        print!("{}", plain_text(&page_view));
        return Ok(());
    }

    // Initialize terminal
    let mut terminal = init_terminal()?;

    let mut app = App::new(config.initial_view(), config.reset_page_on_filter_change);

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &config).await;

    // Restore terminal
    restore_terminal()?;

    result
}

async fn load_schedule(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    app.set_loading("Fetching the schedule...");
    terminal.draw(|f| draw(f, app))?;

    let fetched = fetch_schedule(&config.feed_url, config.request_timeout()).await;
    app.load(fetched, Utc::now());
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    load_schedule(terminal, app, config).await?;

    loop {
        // Draw UI
        terminal.draw(|f| draw(f, app))?;

        // Poll for events
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? {
            match app.handle_input(key) {
                Action::Quit => break,
                Action::Reload => {
                    info!("Reloading schedule");
                    load_schedule(terminal, app, config).await?;
                }
                Action::None => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
