mod app;
mod config;
mod form;
mod predict;
mod risk;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use form::FormInput;
use predict::PredictionClient;

#[derive(Parser, Debug)]
#[command(name = "hyperrisk")]
#[command(version = "0.1.0")]
#[command(about = "Terminal client for a fuzzy-logic hypertension risk service")]
struct Args {
    /// Prediction service URL (overrides the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Run a single prediction without the TUI and print it as JSON
    #[arg(long)]
    once: bool,

    /// Systolic pressure in mmHg (with --once)
    #[arg(long, default_value_t = 120.0, allow_negative_numbers = true)]
    systolic: f64,

    /// Diastolic pressure in mmHg (with --once)
    #[arg(long, default_value_t = 80.0, allow_negative_numbers = true)]
    diastolic: f64,

    /// Age in years (with --once)
    #[arg(long, default_value_t = 30.0, allow_negative_numbers = true)]
    age: f64,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let tui = !args.once && !args.init_config;
    init_logging(args.log_file.as_deref(), tui)?;

    if args.init_config {
        return init_config();
    }

    let config = AppConfig::load();
    let endpoint = args.endpoint.clone().unwrap_or_else(|| config.endpoint.clone());
    let client = PredictionClient::new(endpoint, config.request_timeout())?;

    if args.once {
        let input = FormInput {
            systolic: args.systolic,
            diastolic: args.diastolic,
            age: args.age,
        };
        return predict_once(&client, input).await;
    }

    ui::init_theme(theme::Theme::load(config.theme_file.as_deref()));
    run_tui(client).await
}

/// stderr shares the terminal with the alternate screen, so the TUI only
/// logs when a file is given.
fn log_to_stderr(log_file: Option<&Path>, tui: bool) -> bool {
    log_file.is_none() && !tui
}

fn init_logging(log_file: Option<&Path>, tui: bool) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Could not open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = log_to_stderr(log_file, tui)
        .then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    Ok(())
}

fn init_config() -> Result<()> {
    let path = AppConfig::config_path()?;
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    AppConfig::default().save_to(&path)?;
    println!("{}", path.display());
    Ok(())
}

async fn predict_once(client: &PredictionClient, input: FormInput) -> Result<()> {
    let outcome = predict::submit(client, input).await;
    let style = outcome
        .prediction()
        .map(|p| risk::style_for_opt(p.label.as_deref()));

    let output = serde_json::json!({
        "input": input,
        "outcome": outcome,
        "style": style,
    });
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

async fn run_tui(client: PredictionClient) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client);

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Event polling blocks this task, so let the request task make progress
        let has_event = tokio::task::block_in_place(|| {
            event::poll(std::time::Duration::from_millis(100))
        })?;

        if has_event {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        app.tick();
    }
}
