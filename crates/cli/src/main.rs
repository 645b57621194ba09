// rgrid - headless reward chart operations
// Every command reads a .chart file, applies one change, and writes it back.

mod chart_ops;
mod exit_codes;
mod util;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rewardgrid_config::session::Session;
use rewardgrid_config::settings::Settings;
use rewardgrid_config::theme::{parse_hex_color, ThemeName};
use rewardgrid_engine::chart::Chart;
use rewardgrid_io::store::{self, export_file_name, FileStore};
use rewardgrid_io::{legacy, StoreError};

use chart_ops::{resolve_target, Axis, ChartFile};
use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rgrid")]
#[command(about = "Classroom reward charts from the command line")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Directory holding settings.json and session.json
    #[arg(long, global = true, env = "RGRID_CONFIG_DIR", value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new chart file
    #[command(after_help = "\
Examples:
  rgrid new class.chart --title 'Class 3B' --column HW1 --column HW2 --row Ana --row Ben
  rgrid new ./charts --title 'Spring term'     # writes ./charts/Spring term.chart")]
    New {
        /// File to create, or an existing directory to create it in
        file: PathBuf,

        #[arg(long)]
        title: Option<String>,

        /// Column label (repeatable)
        #[arg(long = "column", value_name = "LABEL")]
        columns: Vec<String>,

        /// Row label (repeatable)
        #[arg(long = "row", value_name = "LABEL")]
        rows: Vec<String>,

        /// Replace the file if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Show a chart's rows, columns and star counts
    Inspect {
        /// Chart to show (defaults to the last chart rgrid wrote)
        file: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Award stars to one cell
    #[command(after_help = "\
Rows and columns are picked by label or by 1-based position:
  rgrid award class.chart --row Ana --column HW1
  rgrid award class.chart --row '#2' --column '#1' --count 3
  rgrid award class.chart --row Ana --column HW2 --color '#FFD400'")]
    Award {
        file: PathBuf,

        #[arg(long)]
        row: String,

        #[arg(long)]
        column: String,

        /// Star color (CSS hex); picked from the palette when omitted
        #[arg(long)]
        color: Option<String>,

        /// Number of stars to award
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Append rows
    AddRow {
        file: PathBuf,
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Append columns
    AddColumn {
        file: PathBuf,
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Remove a row and its stars
    RemoveRow { file: PathBuf, row: String },

    /// Remove a column and its stars
    RemoveColumn { file: PathBuf, column: String },

    /// Rename a row (empty label becomes "(Unnamed)")
    RenameRow { file: PathBuf, row: String, label: String },

    /// Rename a column (empty label becomes "(Unnamed)")
    RenameColumn { file: PathBuf, column: String, label: String },

    /// Set the chart title
    Title { file: PathBuf, text: String },

    /// Remove every star, keeping rows and columns
    ClearStars { file: PathBuf },

    /// Rewrite a chart (including legacy formats) in the current format
    Migrate {
        input: PathBuf,

        /// Output file (defaults to overwriting the input)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show or change settings
    #[command(after_help = "\
Examples:
  rgrid config
  rgrid config --theme colorful --title-color '#1E3A8A'
  rgrid config --default-name 'class chart'")]
    Config {
        /// original | colorful
        #[arg(long)]
        theme: Option<String>,

        /// Title color for the colorful theme (CSS hex)
        #[arg(long)]
        title_color: Option<String>,

        /// Suggested file name for new charts
        #[arg(long)]
        default_name: Option<String>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  rewardgrid-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let mut ctx = Context::load(cli.config_dir);

    let result = match cli.command {
        Commands::New { file, title, columns, rows, force } => {
            cmd_new(&mut ctx, &file, title, &columns, &rows, force)
        }
        Commands::Inspect { file, json } => cmd_inspect(&ctx, file, json),
        Commands::Award { file, row, column, color, count } => {
            cmd_award(&mut ctx, &file, &row, &column, color, count)
        }
        Commands::AddRow { file, labels } => edit(&mut ctx, &file, |chart| {
            let added = labels.iter().filter(|l| chart.add_row(l)).count();
            Ok(format!("added {} row(s)", added))
        }),
        Commands::AddColumn { file, labels } => edit(&mut ctx, &file, |chart| {
            let added = labels.iter().filter(|l| chart.add_column(l)).count();
            Ok(format!("added {} column(s)", added))
        }),
        Commands::RemoveRow { file, row } => edit(&mut ctx, &file, |chart| {
            let index = resolve_target(chart, Axis::Row, &row)?;
            let label = chart.rows()[index].label().to_string();
            chart.remove_row(index);
            Ok(format!("removed row {}", label))
        }),
        Commands::RemoveColumn { file, column } => edit(&mut ctx, &file, |chart| {
            let index = resolve_target(chart, Axis::Column, &column)?;
            let label = chart.columns()[index].label().to_string();
            chart.remove_column(index);
            Ok(format!("removed column {}", label))
        }),
        Commands::RenameRow { file, row, label } => edit(&mut ctx, &file, |chart| {
            let index = resolve_target(chart, Axis::Row, &row)?;
            chart.rename_row(index, &label);
            Ok(format!("row #{} is now {}", index + 1, chart.rows()[index].label()))
        }),
        Commands::RenameColumn { file, column, label } => edit(&mut ctx, &file, |chart| {
            let index = resolve_target(chart, Axis::Column, &column)?;
            chart.rename_column(index, &label);
            Ok(format!("column #{} is now {}", index + 1, chart.columns()[index].label()))
        }),
        Commands::Title { file, text } => edit(&mut ctx, &file, |chart| {
            chart.set_title(&text);
            Ok(format!("title is now {}", chart.title()))
        }),
        Commands::ClearStars { file } => edit(&mut ctx, &file, |chart| {
            let removed = chart.total_stars();
            chart.clear_stars();
            Ok(format!("cleared {} star(s)", removed))
        }),
        Commands::Migrate { input, output } => cmd_migrate(&mut ctx, &input, output),
        Commands::Config { theme, title_color, default_name } => {
            cmd_config(&mut ctx, theme, title_color, default_name)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Map a store failure onto the I/O or parse exit code.
    pub fn store(err: StoreError) -> Self {
        match err {
            StoreError::Read(_) | StoreError::Write(_) => Self::io(err.to_string()),
            StoreError::Codec(_) => Self::parse(err.to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// settings + session
// ============================================================================

struct Context {
    settings: Settings,
    settings_path: PathBuf,
    session: Session,
    session_path: PathBuf,
}

impl Context {
    fn load(dir: Option<PathBuf>) -> Self {
        let dir = dir.unwrap_or_else(rewardgrid_config::config_dir);
        let settings_path = Settings::path_in(&dir);
        let session_path = Session::path_in(&dir);

        let settings = Settings::load_in(&dir);
        let session = Session::load_from(&session_path).unwrap_or_default();
        Self { settings, settings_path, session, session_path }
    }

    /// Remember `path` as the last chart touched. Failure only logs.
    fn remember(&mut self, path: &Path) {
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.session.note_opened(path);
        if let Err(e) = self.session.save_to(&self.session_path) {
            log::warn!("could not save session to {}: {}", self.session_path.display(), e);
        }
    }
}

fn print_line(line: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", line).map_err(|e| CliError::io(e.to_string()))
}

/// Hint used when a save has to create a new file next to `file`.
fn name_hint(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Open `file`, apply `change`, write the chart back and print the summary.
fn edit<F>(ctx: &mut Context, file: &Path, change: F) -> Result<(), CliError>
where
    F: FnOnce(&mut Chart) -> Result<String, CliError>,
{
    let mut chart_file = ChartFile::open(file)?;
    let summary = change(&mut chart_file.chart)?;
    if !chart_file.chart.is_dirty() {
        log::debug!("{} unchanged", file.display());
        return print_line(&format!("{} (no change)", summary));
    }
    let written = chart_file.save(&name_hint(file))?;
    ctx.remember(&written);
    print_line(&summary)
}

// ============================================================================
// new
// ============================================================================

fn cmd_new(
    ctx: &mut Context,
    file: &Path,
    title: Option<String>,
    columns: &[String],
    rows: &[String],
    force: bool,
) -> Result<(), CliError> {
    let mut chart = Chart::new();
    if let Some(title) = &title {
        chart.set_title(title);
    }
    for label in columns {
        if !chart.add_column(label) {
            log::warn!("skipping blank column label");
        }
    }
    for label in rows {
        if !chart.add_row(label) {
            log::warn!("skipping blank row label");
        }
    }

    let (store, hint) = if file.is_dir() {
        let hint = title.unwrap_or_else(|| ctx.settings.default_file_name.clone());
        (FileStore::in_dir(file), hint)
    } else {
        (FileStore::for_file(file), name_hint(file))
    };

    let target = match store.path() {
        Some(path) => path.to_path_buf(),
        None => file.join(export_file_name(&hint)),
    };
    if target.exists() && !force {
        return Err(CliError::args(format!("{} already exists", target.display()))
            .with_hint("pass --force to replace it"));
    }

    let mut chart_file = ChartFile::create(chart, store);
    let written = chart_file.save(&hint)?;
    ctx.remember(&written);
    print_line(&format!(
        "created {} ({} rows x {} columns)",
        written.display(),
        chart_file.chart.row_count(),
        chart_file.chart.column_count()
    ))
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(ctx: &Context, file: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let file = match file {
        Some(file) => file,
        None => ctx.session.current_chart().map(Path::to_path_buf).ok_or_else(|| {
            CliError::args("no chart given and no recent chart on record")
                .with_hint("pass a .chart file")
        })?,
    };
    log::debug!("inspecting {}", file.display());
    let chart_file = ChartFile::open(&file)?;
    if json {
        let value = chart_ops::inspect_json(&chart_file.chart);
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::other(e.to_string()))?;
        print_line(&text)
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", chart_ops::inspect_table(&chart_file.chart))
            .map_err(|e| CliError::io(e.to_string()))
    }
}

// ============================================================================
// award
// ============================================================================

fn cmd_award(
    ctx: &mut Context,
    file: &Path,
    row: &str,
    column: &str,
    color: Option<String>,
    count: usize,
) -> Result<(), CliError> {
    if count == 0 {
        return Err(CliError::args("--count must be at least 1"));
    }
    if let Some(c) = &color {
        if parse_hex_color(c).is_none() {
            return Err(CliError::args(format!("invalid color: {}", c))
                .with_hint("use a CSS hex color such as #FF6B00"));
        }
    }

    edit(ctx, file, |chart| {
        let r = resolve_target(chart, Axis::Row, row)?;
        let c = resolve_target(chart, Axis::Column, column)?;
        chart.set_show_mode(true);
        for _ in 0..count {
            if chart.place_token(r, c, color.as_deref()).is_none() {
                return Err(CliError::other("star could not be placed"));
            }
        }
        let cell = chart.cell(r, c).map(|cell| cell.len()).unwrap_or(0);
        Ok(format!(
            "{} x {}: {} star(s) in cell, {} total for {}",
            chart.rows()[r].label(),
            chart.columns()[c].label(),
            cell,
            chart.star_count(r).unwrap_or(0),
            chart.rows()[r].label()
        ))
    })
}

// ============================================================================
// migrate
// ============================================================================

fn cmd_migrate(ctx: &mut Context, input: &Path, output: Option<PathBuf>) -> Result<(), CliError> {
    let bytes = fs::read(input).map_err(|e| CliError::io(format!("{}: {}", input.display(), e)))?;
    let raw = rewardgrid_io::deserialize(&bytes).map_err(|e| CliError::store(e.into()))?;
    let was_legacy = legacy::normalize(raw.clone()) != raw;

    let mut chart = Chart::new();
    rewardgrid_io::load_into(&mut chart, &bytes).map_err(|e| CliError::store(e.into()))?;

    let target = output.unwrap_or_else(|| input.to_path_buf());
    let mut sink = FileStore::for_file(&target);
    store::save_chart(&mut chart, &mut sink, &name_hint(&target)).map_err(CliError::store)?;
    ctx.remember(&target);

    print_line(&format!(
        "{} {} -> {} ({} rows x {} columns, {} stars)",
        if was_legacy { "upgraded" } else { "rewrote" },
        input.display(),
        target.display(),
        chart.row_count(),
        chart.column_count(),
        chart.total_stars()
    ))
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(
    ctx: &mut Context,
    theme: Option<String>,
    title_color: Option<String>,
    default_name: Option<String>,
) -> Result<(), CliError> {
    let changing = theme.is_some() || title_color.is_some() || default_name.is_some();

    if let Some(theme) = theme {
        let parsed = ThemeName::parse_or_default(&theme);
        if parsed.as_str() != theme.trim().to_ascii_lowercase() {
            return Err(CliError::args(format!("unknown theme: {}", theme))
                .with_hint("themes: original, colorful"));
        }
        ctx.settings.theme = parsed;
    }
    if let Some(color) = title_color {
        if color.trim().is_empty() {
            ctx.settings.title_color = None;
        } else if parse_hex_color(&color).is_some() {
            ctx.settings.title_color = Some(color.trim().to_string());
        } else {
            return Err(CliError::args(format!("invalid color: {}", color)));
        }
    }
    if let Some(name) = default_name {
        ctx.settings.default_file_name = name;
    }

    if changing {
        ctx.settings
            .save_to(&ctx.settings_path)
            .map_err(|e| CliError::io(format!("{}: {}", ctx.settings_path.display(), e)))?;
        log::debug!("settings written to {}", ctx.settings_path.display());
    }

    let text = serde_json::to_string_pretty(&ctx.settings).map_err(|e| CliError::other(e.to_string()))?;
    print_line(&text)?;
    if ctx.settings.title_color.is_some() && !ctx.settings.theme.allows_title_color() {
        eprintln!("note: title color only applies with the colorful theme");
    }
    Ok(())
}
