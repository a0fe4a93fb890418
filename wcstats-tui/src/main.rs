mod tui;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tui::app::App;
use tui::events::handle_key;
use tui::ui::render;
use wcstats_common::{Config, ExportFormat};
use wcstats_core::{
    aggregate, export_csv, export_json, filter_chain, prettify, print_table, sort_by_field,
    AggregateOptions, Field, Query, TeamSummary, TeamTable,
};

#[derive(Parser)]
#[command(name = "wcstats", version, about = "World Cup team statistics from match results")]
struct Cli {
    /// Config file path (defaults to the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Tournament to aggregate (overrides config)
    #[arg(long, global = true)]
    tournament: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one team's summary line
    Team { path: PathBuf, name: String },
    /// Filter teams with field[__op]=value terms; `mode=and|or` picks the combinator
    Query {
        path: PathBuf,
        terms: Vec<String>,
        /// Further filter stage over the previous result, one term per argument: `--then mode=or losses__gt=3`
        #[arg(long, num_args = 1.., action = ArgAction::Append)]
        then: Vec<Vec<String>>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Aligned table of every team
    Table { path: PathBuf },
    /// Write all summaries as JSON or CSV
    Export {
        path: PathBuf,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Chart goals scored/taken over time
    Plot { path: PathBuf, team: Option<String> },
    /// Print a shell completion script
    Completions { shell: clap_complete::Shell },
    /// Write a default config file
    Config {
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let mut opts = AggregateOptions::from(&config.data);
    if let Some(t) = cli.tournament {
        opts.tournament = t;
    }

    match cli.command {
        Commands::Team { path, name } => run_team(&path, &name, &opts)?,
        Commands::Query { path, terms, then, sort, desc, limit } => {
            run_query(&path, &terms, &then, sort.as_deref(), desc, limit, &opts)?
        }
        Commands::Table { path } => {
            let table = load(&path, &opts)?;
            print_table(&mut io::stdout().lock(), &table.sorted(), config.display.float_precision)?;
        }
        Commands::Export { path, format, output } => run_export(&path, format, output, &opts, &config)?,
        Commands::Plot { path, team } => run_plot(&path, team, &opts, &config)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "wcstats", &mut io::stdout());
        }
        Commands::Config { init } => {
            let path = cli.config.unwrap_or_else(Config::default_path);
            if init {
                Config::default().save(&path)?;
                println!("Config written to {}", path.display());
            } else {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn load(path: &Path, opts: &AggregateOptions) -> anyhow::Result<TeamTable> {
    if !path.exists() { anyhow::bail!("input not found: {}", path.display()); }
    let table = aggregate(path, opts)?;
    if table.is_empty() {
        log::warn!("no '{}' matches in {}", opts.tournament, path.display());
    }
    Ok(table)
}

fn run_team(path: &Path, name: &str, opts: &AggregateOptions) -> anyhow::Result<()> {
    let table = load(path, opts)?;
    let Some(summary) = table.get(name) else {
        anyhow::bail!("team not found: {name}");
    };
    println!("{}", prettify(summary));
    Ok(())
}

/// Splits `key=value` CLI terms into pairs.
fn parse_terms(terms: &[String]) -> anyhow::Result<Query> {
    let mut pairs = Vec::with_capacity(terms.len());
    for term in terms {
        let Some((key, value)) = term.split_once('=') else {
            anyhow::bail!("expected key=value, got '{term}'");
        };
        pairs.push((key, value));
    }
    Ok(Query::from_pairs(pairs)?)
}

fn run_query(
    path: &Path,
    terms: &[String],
    then: &[Vec<String>],
    sort: Option<&str>,
    desc: bool,
    limit: Option<usize>,
    opts: &AggregateOptions,
) -> anyhow::Result<()> {
    // validate every stage before touching the input
    let mut stages = vec![parse_terms(terms)?];
    for stage in then {
        stages.push(parse_terms(stage)?);
    }
    let sort_field = sort.map(str::parse::<Field>).transpose()?;

    let table = load(path, opts)?;
    let mut hits: Vec<&TeamSummary> = filter_chain(table.sorted(), &stages);
    if let Some(field) = sort_field {
        sort_by_field(&mut hits, field, desc);
    }
    if let Some(n) = limit {
        hits.truncate(n);
    }
    let mut out = io::stdout().lock();
    for s in &hits {
        writeln!(out, "{}", prettify(s))?;
    }
    writeln!(out, "{} team(s)", hits.len())?;
    Ok(())
}

fn run_export(
    path: &Path,
    format: Option<String>,
    output: Option<PathBuf>,
    opts: &AggregateOptions,
    config: &Config,
) -> anyhow::Result<()> {
    let format = match format {
        Some(f) => f.parse::<ExportFormat>()?,
        None => config.export.format,
    };
    let table = load(path, opts)?;
    let rows = table.sorted();
    let out_path = output.unwrap_or_else(|| config.export.default_output(format));
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
    }
    match format {
        ExportFormat::Json => export_json(&out_path, &rows)?,
        ExportFormat::Csv => export_csv(&out_path, &rows, config.display.float_precision)?,
    }
    println!("Exported {} teams to {}", rows.len(), out_path.display());
    Ok(())
}

fn run_plot(path: &Path, team: Option<String>, opts: &AggregateOptions, config: &Config) -> anyhow::Result<()> {
    let table = load(path, opts)?;
    if table.is_empty() { anyhow::bail!("nothing to plot: no matches for '{}'", opts.tournament); }
    let mut app = App::new(path.display().to_string(), table.into_sorted(), config);
    if let Some(name) = team {
        if !app.select_by_name(&name) { anyhow::bail!("team not found: {name}"); }
    }

    guarded(enable_raw_mode, || draw_loop(&mut app), restore_terminal)
}

/// Runs `body` after `enter`; `leave` runs whenever `enter` succeeded, and a `body` error wins over a `leave` error.
fn guarded<T>(
    enter: impl FnOnce() -> io::Result<()>,
    body: impl FnOnce() -> anyhow::Result<T>,
    leave: impl FnOnce() -> io::Result<()>,
) -> anyhow::Result<T> {
    enter()?;
    let result = body();
    let restored = leave();
    let value = result?;
    restored?;
    Ok(value)
}

fn draw_loop(app: &mut App) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick = Duration::from_millis(100);
    loop {
        terminal.draw(|f| render(f, app))?;
        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? { handle_key(app, key); }
        }
        if app.should_quit { return Ok(()); }
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, crossterm::cursor::Show)
}
