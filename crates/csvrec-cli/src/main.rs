//! csvrec CLI
//!
//! Command-line tool for inspecting, converting and remapping delimited record files.

use clap::{Parser, Subcommand};
use csvrec_core::{ColumnMapper, CsvReader, CsvWriter, FileSource, Header, Record};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "csvrec")]
#[command(about = "Delimited record file toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the records of a CSV file as a table
    Show {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Field delimiter of the input
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Columns to display (comma-separated)
        #[arg(short, long)]
        columns: Option<String>,
    },

    /// Rewrite a CSV file with a different field delimiter
    Convert {
        /// Path to the input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Field delimiter of the input
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Field delimiter of the output
        #[arg(long, default_value = ";")]
        out_delimiter: char,

        /// Append to the output instead of replacing it
        #[arg(short, long)]
        append: bool,

        /// Prefix the output file name with a timestamp
        #[arg(short, long)]
        prefixed: bool,
    },

    /// Project records onto a different header via a mapping specification
    Map {
        /// Path to the input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Field delimiter of the input
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Path to the mapping specification (target[=source] per line)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the CSV files under one or more directories
    Scan {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> csvrec_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            file,
            delimiter,
            limit,
            columns,
        } => cmd_show(&file, delimiter, limit, columns),
        Commands::Convert {
            input,
            delimiter,
            output,
            out_delimiter,
            append,
            prefixed,
        } => cmd_convert(&input, delimiter, &output, out_delimiter, append, prefixed),
        Commands::Map {
            input,
            delimiter,
            spec,
            output,
        } => cmd_map(&input, delimiter, &spec, &output),
        Commands::Scan { root, json } => cmd_scan(&root, json),
    }
}

fn open_reader(path: &Path, delimiter: Option<char>) -> csvrec_core::Result<CsvReader<FileSource>> {
    let mut reader = CsvReader::new();
    if let Some(delimiter) = delimiter {
        reader.set_delimiter(delimiter)?;
    }
    reader.open(FileSource::open(path)?)?;

    Ok(reader)
}

fn cmd_show(
    file: &Path,
    delimiter: Option<char>,
    limit: Option<usize>,
    columns: Option<String>,
) -> csvrec_core::Result<()> {
    let mut reader = open_reader(file, delimiter)?;

    let Some(header) = reader.header().cloned() else {
        println!("{} is empty", file.display());
        return Ok(());
    };

    // Filter columns if specified
    let col_filter: Option<Vec<&str>> = columns.as_ref().map(|c| c.split(',').collect());

    let display_cols: Vec<&str> = if let Some(ref filter) = col_filter {
        header
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|name| filter.contains(name))
            .collect()
    } else {
        header.columns().iter().map(String::as_str).collect()
    };

    println!("{}", display_cols.join("\t"));
    println!("{}", "-".repeat(display_cols.len() * 12));

    let rows: Vec<Record> = reader.records().collect::<csvrec_core::Result<_>>()?;

    let row_limit = limit.unwrap_or(rows.len());
    for record in rows.iter().take(row_limit) {
        let values: Vec<&str> = display_cols
            .iter()
            .map(|name| record.find(name).unwrap_or_default())
            .collect();
        println!("{}", values.join("\t"));
    }

    if rows.len() > row_limit {
        println!("... ({} more rows)", rows.len() - row_limit);
    }

    Ok(())
}

fn cmd_convert(
    input: &Path,
    delimiter: Option<char>,
    output: &Path,
    out_delimiter: char,
    append: bool,
    prefixed: bool,
) -> csvrec_core::Result<()> {
    let mut reader = open_reader(input, delimiter)?;

    let Some(source_header) = reader.header().cloned() else {
        println!("{} is empty, nothing to convert", input.display());
        return Ok(());
    };

    let mut target_header = Header::new(source_header.columns().iter().cloned());
    target_header.set_delimiter(out_delimiter)?;
    let target_header = target_header.shared();

    let output = if prefixed {
        prefixed_path(output)
    } else {
        output.to_path_buf()
    };
    let mut writer = if append {
        CsvWriter::append_path(&output)?
    } else {
        CsvWriter::create_path(&output)?
    };

    while let Some(record) = reader.read_record()? {
        let converted = Record::from_values(&target_header, record.values());
        writer.write_record(&converted)?;
    }
    writer.close()?;

    println!(
        "Converted {} records to {}",
        reader.record_count(),
        output.display()
    );

    Ok(())
}

fn cmd_map(
    input: &Path,
    delimiter: Option<char>,
    spec: &Path,
    output: &Path,
) -> csvrec_core::Result<()> {
    let mapper = ColumnMapper::load(spec)?;
    let mut reader = open_reader(input, delimiter)?;
    let mut writer = CsvWriter::create_path(output)?;

    while let Some(record) = reader.read_record()? {
        writer.write_record(&mapper.apply(&record))?;
    }
    writer.close()?;

    println!(
        "Mapped {} records onto [{}] in {}",
        reader.record_count(),
        mapper.header().columns().join(", "),
        output.display()
    );

    Ok(())
}

/// Report line for one scanned file
#[derive(Serialize)]
struct FileReport {
    path: PathBuf,
    columns: usize,
    records: usize,
}

fn cmd_scan(roots: &[PathBuf], json: bool) -> csvrec_core::Result<()> {
    let mut reports: Vec<FileReport> = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "csv") {
                continue;
            }

            let mut reader = CsvReader::from_path(path)?;
            let columns = reader.header().map_or(0, |h| h.column_count());
            let mut records = 0;
            for record in reader.records() {
                record?;
                records += 1;
            }

            reports.push(FileReport {
                path: path.to_path_buf(),
                columns,
                records,
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("Found {} CSV file(s):", reports.len());
        for report in &reports {
            println!(
                "  {} ({} columns, {} records)",
                report.path.display(),
                report.columns,
                report.records
            );
        }
    }

    Ok(())
}

/// Put a `YYYYMMDD-HHMMSS-mmm_` timestamp prefix in front of the file name
fn prefixed_path(path: &Path) -> PathBuf {
    let prefix = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f_");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!("{prefix}{name}"))
}
