use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use stok::config::{Config, ensure_database_directory};
use stok::prompt::LinePrompt;
use stok::tags::{TagCategory, apply_suggestion, format_tags, suggest};
use stok::{
    Confirmation, Database, ImportMode, InventoryError, KeyValueStore, MemoryStore, Prompt,
    Record, RecordId, RecordInput, RecordStore, Session, csv, logging,
};
use time::OffsetDateTime;

/// stok - parts inventory tracker
#[derive(Parser)]
#[command(name = "stok")]
#[command(about = "Track parts, tags and stock counts; exchange them as CSV")]
#[command(version)]
struct Cli {
    /// Directory holding the inventory database (overrides STOK_DATA_DIR)
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is saved
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Add a new record
    Add(AddCommand),
    /// List all records
    List,
    /// Find records by name, code or tag
    Search(SearchCommand),
    /// Change name, code and tags of a record
    Edit(EditCommand),
    /// Delete a record
    Remove(RemoveCommand),
    /// Change the stock of a record
    Stock(StockCommand),
    /// Write all records to a CSV file
    Export(ExportCommand),
    /// Load records from a CSV file
    Import(ImportCommand),
    /// Write a sample CSV file to fill in
    Template(TemplateCommand),
    /// List known tags
    Tags,
    /// Suggest tags for partially typed tag input
    Suggest(SuggestCommand),
    /// Show storage statistics
    Info,
    /// Delete all records and restart id numbering
    Reset,
}

#[derive(Parser)]
struct AddCommand {
    /// Part name
    #[arg(value_name = "NAME")]
    name: String,

    /// Part code
    #[arg(value_name = "CODE")]
    code: String,

    /// Space-separated tags
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,

    /// Units on hand; leave out or pass ? when unknown
    #[arg(short, long, value_name = "STOCK")]
    stock: Option<String>,
}

#[derive(Parser)]
struct SearchCommand {
    #[arg(value_name = "QUERY")]
    query: String,
}

#[derive(Parser)]
struct EditCommand {
    #[arg(value_name = "ID")]
    id: String,

    #[arg(value_name = "NAME")]
    name: String,

    #[arg(value_name = "CODE")]
    code: String,

    /// Space-separated tags; existing tags are kept when omitted
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

#[derive(Parser)]
struct RemoveCommand {
    #[arg(value_name = "ID")]
    id: String,
}

#[derive(Parser)]
struct StockCommand {
    #[command(subcommand)]
    action: StockAction,
}

#[derive(Subcommand)]
enum StockAction {
    /// Add one unit
    Inc {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Remove one unit
    Dec {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Set the stock to a value
    Set {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Parser)]
struct ExportCommand {
    /// Output file (default: stock_takip_<date>_<time>.csv)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct ImportCommand {
    /// CSV file to read
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// How to combine with existing records; asks when omitted
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Only report what would be imported
    #[arg(long)]
    check: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Append,
    Replace,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Append => Self::Append,
            ModeArg::Replace => Self::Replace,
        }
    }
}

#[derive(Parser)]
struct TemplateCommand {
    /// Output file (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct SuggestCommand {
    /// Tag input typed so far
    #[arg(value_name = "INPUT", default_value = "")]
    input: String,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are validation failures, unknown ids and unusable CSV input.
/// Storage and I/O failures are internal errors.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<InventoryError>()
            .is_some_and(InventoryError::is_user_error)
    })
}

fn run(cli: &Cli) -> Result<()> {
    // Needs no stored state.
    if let Commands::Template(cmd) = &cli.command {
        return handle_template(cmd, &mut std::io::stdout().lock());
    }

    let mut session = open_session(cli)?;
    let mut prompt: Box<dyn Prompt> = if cli.yes {
        Box::new(Confirmation::Confirmed)
    } else {
        Box::new(LinePrompt::stdio())
    };

    execute(
        &cli.command,
        &mut session,
        prompt.as_mut(),
        &mut std::io::stdout().lock(),
    )
}

/// Opens the configured store and loads a session from it.
fn open_session(cli: &Cli) -> Result<Session<Box<dyn KeyValueStore>>> {
    let mut config = Config::from_env()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }

    let backend: Box<dyn KeyValueStore> = if cli.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        let db_path = config.database_path();
        ensure_database_directory(&db_path)?;
        let db = Database::open(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        Box::new(db)
    };

    Session::open(RecordStore::with_keys(backend, config.keys)).context("Failed to load inventory")
}

/// Runs one command against an open session.
///
/// Separated from `run` so commands can be tested with in-memory stores,
/// scripted prompts and captured output.
fn execute<S: KeyValueStore>(
    command: &Commands,
    session: &mut Session<S>,
    prompt: &mut dyn Prompt,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Add(cmd) => execute_add(cmd, session, out),
        Commands::List => execute_list(session, out),
        Commands::Search(cmd) => execute_search(cmd, session, out),
        Commands::Edit(cmd) => execute_edit(cmd, session, out),
        Commands::Remove(cmd) => execute_remove(cmd, session, prompt, out),
        Commands::Stock(cmd) => execute_stock(cmd, session, out),
        Commands::Export(cmd) => execute_export(cmd, session, out),
        Commands::Import(cmd) => execute_import(cmd, session, prompt, out),
        Commands::Template(cmd) => handle_template(cmd, out),
        Commands::Tags => execute_tags(session, out),
        Commands::Suggest(cmd) => execute_suggest(cmd, session, out),
        Commands::Info => execute_info(session, out),
        Commands::Reset => execute_reset(session, prompt, out),
    }
}

fn execute_add<S: KeyValueStore>(
    cmd: &AddCommand,
    session: &mut Session<S>,
    out: &mut impl Write,
) -> Result<()> {
    let input = RecordInput::new(&cmd.name, &cmd.code)
        .tags(cmd.tags.as_deref().unwrap_or_default())
        .stock(cmd.stock.as_deref().unwrap_or_default());
    let record = session.add(input).context("Failed to add record")?;

    write!(out, "Record added (id: {})", record.id)?;
    if !record.tags.is_empty() {
        write!(out, " with tags: {}", format_tags(&record.tags))?;
    }
    writeln!(out)?;
    Ok(())
}

fn execute_list<S: KeyValueStore>(session: &Session<S>, out: &mut impl Write) -> Result<()> {
    if session.records().is_empty() {
        writeln!(out, "No records.")?;
        return Ok(());
    }
    for record in session.records() {
        write_record(out, record)?;
    }
    Ok(())
}

fn execute_search<S: KeyValueStore>(
    cmd: &SearchCommand,
    session: &Session<S>,
    out: &mut impl Write,
) -> Result<()> {
    let matches = session.search(cmd.query.trim());
    if matches.is_empty() {
        writeln!(out, "No records match \"{}\".", cmd.query)?;
        return Ok(());
    }
    for record in matches {
        write_record(out, record)?;
    }
    Ok(())
}

fn execute_edit<S: KeyValueStore>(
    cmd: &EditCommand,
    session: &mut Session<S>,
    out: &mut impl Write,
) -> Result<()> {
    let id = RecordId::new(cmd.id.trim());
    let tags = match &cmd.tags {
        Some(tags) => tags.clone(),
        None => session
            .get(&id)
            .map(|r| format_tags(&r.tags))
            .unwrap_or_default(),
    };

    let record = session
        .edit(&id, &cmd.name, &cmd.code, &tags)
        .context("Failed to update record")?;
    writeln!(out, "Record updated:")?;
    write_record(out, &record)?;
    Ok(())
}

fn execute_remove<S: KeyValueStore>(
    cmd: &RemoveCommand,
    session: &mut Session<S>,
    prompt: &mut dyn Prompt,
    out: &mut impl Write,
) -> Result<()> {
    let id = RecordId::new(cmd.id.trim());
    let record = session
        .get(&id)
        .ok_or_else(|| InventoryError::NotFound(id.clone()))?;

    let message = format!("Delete {} ({})?", record.name, record.code);
    if !prompt.confirm(&message)?.is_confirmed() {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }

    let removed = session.delete(&id)?;
    writeln!(out, "Record deleted (id: {})", removed.id)?;
    Ok(())
}

fn execute_stock<S: KeyValueStore>(
    cmd: &StockCommand,
    session: &mut Session<S>,
    out: &mut impl Write,
) -> Result<()> {
    let (id, stock) = match &cmd.action {
        StockAction::Inc { id } => {
            let id = RecordId::new(id.trim());
            let stock = session.increase_stock(&id)?;
            (id, stock)
        }
        StockAction::Dec { id } => {
            let id = RecordId::new(id.trim());
            let stock = session.decrease_stock(&id)?;
            (id, stock)
        }
        StockAction::Set { id, value } => {
            let id = RecordId::new(id.trim());
            let stock = session.set_stock(&id, value)?;
            (id, stock)
        }
    };
    writeln!(out, "{id} stock: {stock}")?;
    Ok(())
}

fn execute_export<S: KeyValueStore>(
    cmd: &ExportCommand,
    session: &Session<S>,
    out: &mut impl Write,
) -> Result<()> {
    let text = session.export_csv()?;
    let path = cmd
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(csv::export_file_name(local_now())));

    std::fs::write(&path, text)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    writeln!(
        out,
        "Exported {} records to {}",
        session.records().len(),
        path.display()
    )?;
    Ok(())
}

fn execute_import<S: KeyValueStore>(
    cmd: &ImportCommand,
    session: &mut Session<S>,
    prompt: &mut dyn Prompt,
    out: &mut impl Write,
) -> Result<()> {
    let text = csv::read_csv_file(&cmd.path)
        .with_context(|| format!("Failed to read {}", cmd.path.display()))?;

    if cmd.check {
        let report = csv::validate_format(&text)?;
        // Trial decode only; ids are never used.
        let outcome = csv::decode(&text, || RecordId::new(""))?;
        writeln!(out, "Columns: {}", report.headers.join(", "))?;
        writeln!(
            out,
            "{} rows: {} valid, {} skipped",
            report.row_count, outcome.success_count, outcome.error_count
        )?;
        return Ok(());
    }

    let outcome = session.decode_csv(&text)?;
    writeln!(
        out,
        "Read {} valid rows, skipped {}",
        outcome.success_count, outcome.error_count
    )?;
    if !outcome.is_valid() {
        writeln!(out, "Nothing to import.")?;
        return Ok(());
    }

    let mode = match cmd.mode {
        Some(mode) => mode.into(),
        None => {
            let answer =
                prompt.confirm("Append to the existing records? Answering no replaces them.")?;
            if answer.is_confirmed() {
                ImportMode::Append
            } else {
                ImportMode::Replace
            }
        }
    };

    let count = session.import(outcome, mode).context("Failed to import records")?;
    let verb = match mode {
        ImportMode::Append => "Appended",
        ImportMode::Replace => "Replaced inventory with",
    };
    writeln!(out, "{verb} {count} records")?;
    Ok(())
}

fn handle_template(cmd: &TemplateCommand, out: &mut impl Write) -> Result<()> {
    let text = csv::template();
    match &cmd.output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write template: {}", path.display()))?;
            writeln!(out, "Template written to {}", path.display())?;
        }
        None => writeln!(out, "{text}")?,
    }
    Ok(())
}

fn execute_tags<S: KeyValueStore>(session: &Session<S>, out: &mut impl Write) -> Result<()> {
    if session.vocabulary().is_empty() {
        writeln!(out, "No tags yet.")?;
        return Ok(());
    }
    for tag in session.vocabulary().iter() {
        writeln!(out, "{}", describe_tag(tag))?;
    }
    Ok(())
}

fn execute_suggest<S: KeyValueStore>(
    cmd: &SuggestCommand,
    session: &Session<S>,
    out: &mut impl Write,
) -> Result<()> {
    for tag in suggest(&cmd.input, session.vocabulary()) {
        writeln!(out, "{tag:<20} {}", apply_suggestion(&cmd.input, &tag).trim_end())?;
    }
    Ok(())
}

fn execute_info<S: KeyValueStore>(session: &Session<S>, out: &mut impl Write) -> Result<()> {
    let info = session.info()?;
    writeln!(out, "Records:      {}", info.record_count)?;
    writeln!(out, "Tags:         {}", info.tag_count)?;
    writeln!(out, "Next counter: {}", info.storage.counter)?;
    writeln!(out, "Stored bytes: {}", info.storage.storage_size)?;
    Ok(())
}

fn execute_reset<S: KeyValueStore>(
    session: &mut Session<S>,
    prompt: &mut dyn Prompt,
    out: &mut impl Write,
) -> Result<()> {
    let answer = prompt.confirm("Delete ALL records and restart numbering?")?;
    if !answer.is_confirmed() {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }
    session.reset()?;
    writeln!(out, "Inventory reset.")?;
    Ok(())
}

fn write_record(out: &mut impl Write, record: &Record) -> std::io::Result<()> {
    let tags: Vec<String> = record.tags.iter().map(|t| describe_tag(t)).collect();
    writeln!(
        out,
        "{:<6} {:<30} {:<16} stock: {:<4} {}",
        record.id,
        record.name,
        record.code,
        record.stock.to_string(),
        tags.join(" ")
    )
}

/// Formats a tag with its category, e.g. `DIRENC [resistor]`.
fn describe_tag(tag: &str) -> String {
    match TagCategory::classify(tag) {
        Some(category) => format!("{tag} [{category}]"),
        None => tag.to_string(),
    }
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
