use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{error, info, LevelFilter};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, File},
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use quizmaster::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, Overrides},
    export::write_csv,
    logging::init_file_logger,
    question::{QuestionBank, DEFAULT_BANK},
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    store::{ResultStore, SqliteProvider, SqliteResultStore, StoreWorker},
};

const TICK_RATE_MS: u64 = 100;

/// timed terminal quiz with per-question countdowns and a score history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed terminal quiz. Each question has its own countdown, skipped questions stay skipped, and every finished attempt is saved to a local history with a score trend chart."
)]
pub struct Cli {
    /// JSON question bank to use instead of the built-in one
    #[clap(short = 'q', long = "questions")]
    question_file: Option<PathBuf>,

    /// number of seconds allowed per question
    #[clap(short = 's', long = "seconds")]
    seconds_per_question: Option<u32>,

    /// location of the results database
    #[clap(long = "db")]
    db_path: Option<PathBuf>,

    /// persist the given options as the new defaults
    #[clap(long)]
    save_config: bool,

    /// open the history screen instead of the welcome screen
    #[clap(long)]
    history: bool,

    /// write all saved results to a CSV file and exit
    #[clap(long, value_name = "CSV")]
    export: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            seconds_per_question: self.seconds_per_question,
            question_file: self.question_file.clone(),
            db_path: self.db_path.clone(),
        }
    }
}

fn setup_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    // the terminal belongs to the UI, so a logger failure stays silent
    let _ = init_file_logger(&path, LevelFilter::Info);
}

fn load_bank(config: &Config) -> Result<QuestionBank, quizmaster::error::BankError> {
    match &config.question_file {
        Some(path) => QuestionBank::from_file(path),
        None => QuestionBank::embedded(DEFAULT_BANK),
    }
}

fn export(config: &Config, out: &Path) -> Result<usize, Box<dyn Error>> {
    let store = SqliteResultStore::open(config.resolved_db_path())?;
    let results = store.read_all()?;
    let count = write_csv(results, File::create(out)?)?;
    info!("exported {} results to {}", count, out.display());
    Ok(count)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    setup_logging();

    let config_store = FileConfigStore::new();
    let config = config_store.load().merged(&cli.overrides());
    if cli.save_config {
        if let Err(e) = config_store.save(&config) {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::Io, format!("could not save config: {e}"))
                .exit();
        }
    }

    if let Some(out) = &cli.export {
        match export(&config, out) {
            Ok(count) => {
                println!("exported {} results to {}", count, out.display());
                return Ok(());
            }
            Err(e) => {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::Io, format!("export failed: {e}")).exit();
            }
        }
    }

    let bank = match load_bank(&config) {
        Ok(bank) => bank,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, format!("could not load questions: {e}"))
                .exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    info!(
        "starting quiz '{}' with {} questions, {}s each",
        bank.name,
        bank.len(),
        config.seconds_per_question
    );

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let events = runner.sender();
    let store = StoreWorker::spawn(SqliteProvider::new(config.resolved_db_path()), move |ev| {
        let _ = events.send(QuizEvent::Store(ev));
    });

    let mut app = App::new(bank, config.seconds_per_question, Some(store));
    if cli.history {
        app.open_history();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, &runner);
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &outcome {
        error!("quiz loop failed: {}", e);
    }
    outcome
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    let mut last_tick = Instant::now();
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();
        // the countdown follows wall-clock time between events
        let now = Instant::now();
        app.on_tick(now.duration_since(last_tick));
        last_tick = now;

        match event {
            QuizEvent::Key(key) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
            }
            QuizEvent::Store(ev) => app.on_store_event(ev),
            QuizEvent::Resize | QuizEvent::Tick => {}
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    info!("quitting");
    Ok(())
}
