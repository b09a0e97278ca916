use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::style;
use gistdeck::gist::{Gist, PageCursor};
use gistdeck::language::language_display_name;
use gistdeck::relative_time::{created_phrase, updated_phrase};
use serde::Serialize;
use tabled::Tabled;

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

const TITLE_WIDTH: usize = 48;

/// One gist in a listing.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct GistRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Owner")]
    pub owner: String,
    #[tabled(rename = "Files")]
    pub files: usize,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Visibility")]
    pub visibility: String,
    #[tabled(rename = "Updated")]
    pub updated: String,
}

impl GistRow {
    pub(crate) fn from_gist(gist: &Gist, now: DateTime<Utc>) -> Self {
        Self {
            id: gist.id.clone(),
            title: truncate(gist.title(), TITLE_WIDTH),
            owner: gist.owner_login().unwrap_or("anonymous").to_string(),
            files: gist.files.len(),
            language: gist
                .primary_file()
                .map(|f| language_display_name(&f.filename))
                .unwrap_or_default(),
            visibility: if gist.public { "public" } else { "secret" }.to_string(),
            updated: updated_phrase(gist.updated_at, now),
        }
    }
}

/// One file of a single gist.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct FileRow {
    #[tabled(rename = "File")]
    pub filename: String,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Size")]
    pub size: u64,
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);
}

pub(crate) fn print_gists(
    gists: &[Gist],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            if gists.is_empty() {
                println!("No gists found.");
            } else {
                let now = Utc::now();
                print_table(gists.iter().map(|g| GistRow::from_gist(g, now)).collect());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(gists)?),
    }
    Ok(())
}

/// A listing page followed by a pagination hint.
pub(crate) fn print_page(
    gists: &[Gist],
    cursor: &PageCursor,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    print_gists(gists, format)?;
    if format == OutputFormat::Table {
        println!("{}", page_footer(cursor));
    }
    Ok(())
}

pub(crate) fn page_footer(cursor: &PageCursor) -> String {
    let mut footer = format!(
        "Page {} of ~{}",
        cursor.current_page,
        cursor.estimated_total_pages()
    );
    if let Some(next) = cursor.next_page() {
        footer.push_str(&format!(" (next: --page {})", next));
    }
    footer
}

pub(crate) fn print_gist_detail(
    gist: &Gist,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(gist)?);
        return Ok(());
    }

    let now = Utc::now();
    println!("{}", style(gist.title()).bold());
    println!(
        "{} · {} · {}",
        gist.owner_login().unwrap_or("anonymous"),
        created_phrase(gist.created_at, now),
        updated_phrase(gist.updated_at, now)
    );
    println!("{}", style(&gist.html_url).underlined());

    let files: Vec<FileRow> = gist
        .files
        .iter()
        .map(|f| FileRow {
            filename: f.filename.clone(),
            language: language_display_name(&f.filename),
            size: f.size,
        })
        .collect();
    if !files.is_empty() {
        print_table(files);
    }
    Ok(())
}

pub(crate) fn success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub(crate) fn failure(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}
