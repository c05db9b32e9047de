use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use tracing::error;

use section_catalog::report::{self, ReportFormat};
use section_catalog::{catalog_directory, json, Catalog, Config};

#[derive(Parser)]
#[command(
    name = "section-catalog",
    about = "Catalog unique HTML sections by classes and content"
)]
struct Cli {
    /// Root directory to search for HTML files
    directory: PathBuf,

    /// Output JSON file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output report path (Markdown when it ends in .md, plain text otherwise)
    #[arg(short, long)]
    text: Option<PathBuf>,

    /// Show detailed information about each occurrence
    #[arg(short, long)]
    details: bool,

    /// Show content breakdown for each section (reserved)
    #[arg(short, long)]
    content: bool,

    /// Show sections with same classes but different content
    #[arg(short, long)]
    similar: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = Config::default()
        .with_show_details(cli.details)
        .with_show_content(cli.content);

    let (catalog, scan) = catalog_directory(&cli.directory, &config)?;

    println!("\nProcessed {} HTML files", scan.files_processed);
    if scan.files_failed > 0 {
        println!("Skipped {} unreadable files", scan.files_failed);
    }
    println!("Found {} total sections", scan.sections_found);
    println!("Found {} unique section structures", catalog.len());

    if catalog.is_empty() {
        println!("No sections found!");
        return Ok(());
    }

    let format = cli
        .text
        .as_deref()
        .map(ReportFormat::for_path)
        .unwrap_or_default();
    let rendered = report::render_catalog(&catalog, format, &config);
    println!("{rendered}");

    if let Some(path) = &cli.text {
        match report::write_report(path, &rendered) {
            Ok(()) => println!("\nOutput saved to: {}", path.display()),
            Err(e) => error!("Error writing to file: {e}"),
        }
    }

    if cli.similar {
        print_similar(&catalog, cli.text.as_deref(), format);
    }

    if let Some(path) = &cli.output {
        match json::write_json(&catalog, path) {
            Ok(()) => println!("\nResults saved to: {}", path.display()),
            Err(e) => error!("Error writing JSON: {e}"),
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

/// Append the variant report to a Markdown file, or print it.
fn print_similar(catalog: &Catalog, text_path: Option<&Path>, format: ReportFormat) {
    if let (ReportFormat::Markdown, Some(path)) = (format, text_path) {
        // Nothing is appended when every group is uniform.
        let Some(variants) = report::render_variants(catalog, format) else {
            return;
        };
        match report::append_report(path, &variants) {
            Ok(()) => {
                println!("Similar sections analysis added to: {}", path.display());
                return;
            }
            Err(e) => error!("Error adding similar sections to file: {e}"),
        }
    }

    match report::render_variants(catalog, ReportFormat::Plain) {
        Some(variants) => println!("{variants}"),
        None => println!("\nNo sections found with same classes but different content."),
    }
}
