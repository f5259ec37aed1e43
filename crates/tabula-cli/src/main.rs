//! tabula CLI: inspect and reshape CSV files from the shell.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tabula_core::config::CsvOptions;
use tabula_core::row::Row;
use tabula_io::writers::CsvWriter;
use tabula_table::{DataTable, MutableDataTable, OffsetIndex, StreamingTable};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Read, reshape and index CSV files", long_about = None)]
struct Cli {
    /// YAML file with parse options (delimiter, trim, mode, max_record_lines)
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header and the first N rows
    Head {
        file: PathBuf,

        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,
    },

    /// List the column names
    Columns { file: PathBuf },

    /// Keep only the named columns, in the given order
    Select {
        file: PathBuf,

        /// Column names, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Ignore names that match no column
        #[arg(long)]
        allow_missing: bool,
    },

    /// Keep rows whose column equals a value
    Filter {
        file: PathBuf,

        #[arg(short, long)]
        column: String,

        #[arg(short, long)]
        equals: String,
    },

    /// Index a key column and print the row for one key
    Lookup {
        file: PathBuf,

        #[arg(short, long)]
        key_column: String,

        key: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read options file {}: {source}", path.display())]
    OptionsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Core(#[from] tabula_core::error::Error),

    #[error(transparent)]
    Table(#[from] tabula_io::error::Error),

    #[error("no row with {column} = {key}")]
    NotFound { column: String, key: String },
}

impl CliError {
    fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::Core(e) => e.suggestions(),
            CliError::Table(e) => e.as_core().map(|c| c.suggestions()).unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

type Result<T> = std::result::Result<T, CliError>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        for hint in e.suggestions() {
            eprintln!("  hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let opts = load_options(cli.options.as_deref())?;
    match cli.command {
        Commands::Head { file, rows } => head(&file, rows, &opts),
        Commands::Columns { file } => {
            let table = StreamingTable::open(&file, &opts)?;
            for name in table.column_names() {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Select {
            file,
            columns,
            allow_missing,
        } => {
            let mut table = MutableDataTable::read_path(&file, &opts)?;
            table.keep_columns(&columns[..], !allow_missing)?;
            let mut out = io::stdout().lock();
            table.save(&mut out)?;
            Ok(())
        }
        Commands::Filter {
            file,
            column,
            equals,
        } => filter(&file, &column, &equals, &opts),
        Commands::Lookup {
            file,
            key_column,
            key,
        } => lookup(&file, &key_column, &key, &opts),
    }
}

fn load_options(path: Option<&Path>) -> Result<CsvOptions> {
    let Some(path) = path else {
        return Ok(CsvOptions::default());
    };
    let text = fs::read_to_string(path).map_err(|source| CliError::OptionsFile {
        path: path.to_path_buf(),
        source,
    })?;
    let opts = CsvOptions::from_yaml_str(&text)?;
    tracing::debug!(?opts, path = %path.display(), "loaded options");
    Ok(opts)
}

fn head(file: &Path, n: usize, opts: &CsvOptions) -> Result<()> {
    let table = StreamingTable::open(file, opts)?;
    let names = table.column_names();
    let mut out = io::stdout().lock();
    let mut wtr = CsvWriter::to_writer(&mut out);
    wtr.write_header(&names)?;
    for row in table.rows()?.take(n) {
        wtr.write_row(row?.values())?;
    }
    wtr.flush()?;
    Ok(())
}

fn filter(file: &Path, column: &str, equals: &str, opts: &CsvOptions) -> Result<()> {
    let table = StreamingTable::open(file, opts)?;
    let names = table.column_names();
    let position = tabula_core::names::position_of(&names, column)
        .ok_or_else(|| tabula_core::error::Error::unknown_column(column))?;

    let mut out = io::stdout().lock();
    let mut wtr = CsvWriter::to_writer(&mut out);
    wtr.write_header(&names)?;
    let mut rows = table.rows()?;
    for row in rows.by_ref() {
        let row = row?;
        if row.value(position) == Some(equals) {
            wtr.write_row(row.values())?;
        }
    }
    wtr.flush()?;
    if rows.dropped() > 0 {
        tracing::warn!(dropped = rows.dropped(), "skipped malformed rows");
    }
    Ok(())
}

fn lookup(file: &Path, key_column: &str, key: &str, opts: &CsvOptions) -> Result<()> {
    let index = OffsetIndex::build(file, key_column, opts)?;
    tracing::debug!(keys = index.len(), skipped = index.skipped(), "built index");
    let row = index.lookup(key)?.ok_or_else(|| CliError::NotFound {
        column: key_column.to_string(),
        key: key.to_string(),
    })?;

    let mut out = io::stdout().lock();
    for (name, value) in row.column_names().iter().zip(row.values()) {
        writeln!(out, "{}: {}", name, value).map_err(tabula_io::error::Error::from)?;
    }
    Ok(())
}
