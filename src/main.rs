mod config;
mod csv_codec;
mod dates;
mod db;
mod error;
mod filter;
mod models;
mod report;
mod ui;
mod writer;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::Config;
use crate::db::{Database, QueryCache};
use crate::error::TrackerError;
use crate::report::Dashboard;
use crate::ui::{
    dashboard::{handle_input as handle_dashboard_input, render_dashboard, DashboardAction, DashboardState},
    grid::{handle_input as handle_grid_input, render_grid, GridAction, GridState},
    Notice,
};

#[derive(Parser)]
#[command(name = "project-tracker", version, about = "5W2H project tracking dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Replace every stored record with the rows of a CSV file
    Import { path: PathBuf },
    /// Write every stored record to a CSV file
    Export { path: PathBuf },
    /// Print the dashboard figures
    Summary,
}

// Represents the current screen in the app
enum AppScreen {
    Grid,
    Dashboard,
}

// Main application state
struct AppState {
    db: Database,
    cache: QueryCache,
    screen: AppScreen,
    grid_state: Option<GridState>,
    dashboard_state: Option<DashboardState>,
}

impl AppState {
    fn new(db: Database, cache: QueryCache) -> Self {
        Self {
            db,
            cache,
            screen: AppScreen::Grid,
            grid_state: None,
            dashboard_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;
    init_logging(&config)?;

    // A store without a usable schema is the one fatal error
    let db = match db::init(&config).await {
        Ok(db) => db,
        Err(err) => {
            error!(error = %err, "database unavailable");
            return Err(anyhow!(err.user_message()));
        }
    };
    let cache = QueryCache::new(config.cache_ttl());
    info!(ttl_secs = cache.ttl().as_secs(), "snapshot cache ready");

    match cli.command {
        Some(Command::Import { path }) => import_file(&db, &cache, &path).await,
        Some(Command::Export { path }) => export_file(&db, &cache, &path).await,
        Some(Command::Summary) => print_summary(&db, &cache).await,
        None => run_tui(db, cache).await,
    }
}

fn init_logging(config: &Config) -> Result<()> {
    // The terminal belongs to the TUI, so events go to a file
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(())
}

async fn import_file(db: &Database, cache: &QueryCache, path: &Path) -> Result<()> {
    let count = read_and_import(db, cache, path)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    println!("Imported {count} records from {}", path.display());
    Ok(())
}

async fn export_file(db: &Database, cache: &QueryCache, path: &Path) -> Result<()> {
    let bytes = export_and_write(db, cache, path)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    println!("Wrote {bytes} bytes to {}", path.display());
    Ok(())
}

async fn print_summary(db: &Database, cache: &QueryCache) -> Result<()> {
    let snapshot = cache
        .get_all(db)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    let report = Dashboard::from_records(&snapshot);

    if report.is_empty() {
        println!("No data available.");
        return Ok(());
    }

    println!("Total actions:    {}", report.total);
    println!("Overdue actions:  {}", report.overdue);
    println!("Upcoming actions: {}", report.upcoming);

    println!("\nActions per task status:");
    for (status, count) in &report.by_status {
        println!("  {status:<16} {count:>5}");
    }

    println!("\nActions per month (planned end):");
    if report.by_month.is_empty() {
        println!("  no valid dates");
    }
    for (month, count) in &report.by_month {
        println!("  {month:<16} {count:>5}");
    }
    if report.undated > 0 {
        println!("  {} records without a readable date", report.undated);
    }

    println!("\nFinancial return types:");
    for (kind, count) in &report.by_return_type {
        println!("  {kind:<16} {count:>5}");
    }

    Ok(())
}

async fn read_and_import(db: &Database, cache: &QueryCache, path: &Path) -> Result<usize, TrackerError> {
    let bytes = std::fs::read(path)?;
    writer::import_csv(db, cache, &bytes).await
}

async fn export_and_write(db: &Database, cache: &QueryCache, path: &Path) -> Result<usize, TrackerError> {
    let bytes = writer::export_csv(db, cache).await?;
    std::fs::write(path, &bytes)?;
    Ok(bytes.len())
}

async fn run_tui(db: Database, cache: QueryCache) -> Result<()> {
    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(db, cache);
    load_grid_screen(&mut app_state).await;

    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "terminal loop failed");
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Grid => {
                if let Some(state) = &mut app_state.grid_state {
                    render_grid(f, state);
                }
            }
            AppScreen::Dashboard => {
                if let Some(state) = &app_state.dashboard_state {
                    render_dashboard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Grid => handle_grid_screen(app_state).await?,
            AppScreen::Dashboard => handle_dashboard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

async fn load_grid_screen(app_state: &mut AppState) {
    match app_state.cache.get_all(&app_state.db).await {
        Ok(snapshot) => match &mut app_state.grid_state {
            Some(state) => state.reload(snapshot),
            None => app_state.grid_state = Some(GridState::new(snapshot, today())),
        },
        Err(err) => {
            error!(error = %err, "could not load records");
            let state = app_state
                .grid_state
                .get_or_insert_with(|| GridState::new(Default::default(), today()));
            state.set_notice(Notice::from_error(&err));
        }
    }
    app_state.screen = AppScreen::Grid;
}

async fn load_dashboard_screen(app_state: &mut AppState) {
    match app_state.cache.get_all(&app_state.db).await {
        Ok(snapshot) => {
            app_state.dashboard_state = Some(DashboardState::new(Dashboard::from_records(&snapshot)));
            app_state.screen = AppScreen::Dashboard;
        }
        Err(err) => {
            error!(error = %err, "could not load dashboard");
            let notice = Notice::from_error(&err);
            match (&app_state.screen, &mut app_state.dashboard_state, &mut app_state.grid_state) {
                (AppScreen::Dashboard, Some(state), _) => state.set_notice(notice),
                (_, _, Some(state)) => state.set_notice(notice),
                _ => {}
            }
        }
    }
}

async fn handle_grid_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.grid_state else {
        return Ok(false);
    };

    match handle_grid_input(state)? {
        Some(GridAction::Quit) => return Ok(true),
        Some(GridAction::SwitchTab) => load_dashboard_screen(app_state).await,
        Some(GridAction::Save(rows)) => {
            let outcome = writer::save_records(&app_state.db, &app_state.cache, &rows).await;
            finish_write(app_state, outcome.map(|count| {
                format!("Data updated successfully! ({count} records saved)")
            }))
            .await;
        }
        Some(GridAction::Import(path)) => {
            let outcome = read_and_import(&app_state.db, &app_state.cache, &path).await;
            finish_write(app_state, outcome.map(|count| {
                format!("Data imported successfully! ({count} records from {})", path.display())
            }))
            .await;
        }
        Some(GridAction::Export(path)) => {
            let notice = match export_and_write(&app_state.db, &app_state.cache, &path).await {
                Ok(_) => Notice::Success(format!("Exported all records to {}", path.display())),
                Err(err) => {
                    error!(error = %err, path = %path.display(), "export failed");
                    Notice::from_error(&err)
                }
            };
            if let Some(state) = &mut app_state.grid_state {
                state.set_notice(notice);
            }
        }
        None => {}
    }

    Ok(false)
}

// Reload the grid after a successful save or import. A failed write keeps
// the rows on screen so nothing typed is lost.
async fn finish_write(app_state: &mut AppState, outcome: Result<String, TrackerError>) {
    let notice = match outcome {
        Ok(message) => {
            info!("{message}");
            load_grid_screen(app_state).await;
            Notice::Success(message)
        }
        Err(err) => {
            error!(error = %err, kind = %err.kind(), "write failed");
            Notice::from_error(&err)
        }
    };

    if let Some(state) = &mut app_state.grid_state {
        state.set_notice(notice);
    }
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.dashboard_state else {
        return Ok(false);
    };

    match handle_dashboard_input(state)? {
        Some(DashboardAction::Quit) => return Ok(true),
        Some(DashboardAction::SwitchTab) => load_grid_screen(app_state).await,
        Some(DashboardAction::Refresh) => load_dashboard_screen(app_state).await,
        None => {}
    }

    Ok(false)
}
