//! Main entry point for the mtar CLI application.
//!
//! Parses arguments, sets up logging and dispatches to create, extract or
//! list. All archive logic lives in the library.

use anyhow::{Context, Result, bail};
use clap::Parser;

use mtar::{ArchiveExtractor, Cli, ExtractOptions, Header};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if cli.create {
        create(&cli)
    } else if cli.extract {
        extract(&cli)
    } else {
        list(&cli)
    }
}

fn create(cli: &Cli) -> Result<()> {
    if cli.files.is_empty() {
        bail!("No files to archive. Usage: mtar -c -f ARCHIVE FILE...");
    }

    let summary = mtar::create(&cli.archive, &cli.files)
        .with_context(|| format!("Failed to create {}", cli.archive))?;

    if !cli.quiet {
        let header = &summary.header;
        println!(
            "mtar file created successfully: {} file(s), {} header + {} data bytes",
            header.file_count(),
            header.byte_size(),
            header.data_len()
        );
    }
    Ok(())
}

fn extract(cli: &Cli) -> Result<()> {
    let options = ExtractOptions {
        output_dir: cli.directory.clone().into(),
        overwrite: cli.overwrite,
    };

    let summary = ArchiveExtractor::new(&cli.archive)
        .with_options(options)
        .extract()
        .with_context(|| format!("Failed to extract {}", cli.archive))?;

    if !cli.quiet {
        for path in &summary.written {
            println!("  extracting: {}", path.display());
        }
    }
    Ok(())
}

fn list(cli: &Cli) -> Result<()> {
    let header = mtar::list(&cli.archive)
        .with_context(|| format!("Failed to read {}", cli.archive))?;

    if cli.verbose > 0 {
        print_table(&header);
    } else {
        for entry in header.entries() {
            println!("{}", entry.name);
        }
    }
    Ok(())
}

/// Print entries with their sizes and data offsets.
fn print_table(header: &Header) {
    println!("{:>10}  {:>10}  Name", "Length", "Offset");
    println!("{}", "-".repeat(40));

    for (index, entry) in header.entries().iter().enumerate() {
        let offset = header.data_offset(index).unwrap_or_default();
        println!("{:>10}  {:>10}  {}", entry.size, offset, entry.name);
    }

    println!("{}", "-".repeat(40));
    println!(
        "{:>10}  {:>10}  {} files",
        header.data_len(),
        "",
        header.file_count()
    );
}
