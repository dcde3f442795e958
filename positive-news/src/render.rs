use crate::result_parser::DISPLAY_FORMAT;
use crate::types::{Category, CuratedRecord, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Europe::Prague;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f5f7f4;color:#1d2a1f}
header{background:#2e7d32;color:#fff;padding:1.5rem 2rem}
header h1{margin:0}
header p{margin:.3rem 0 0;opacity:.85}
main{max-width:60rem;margin:1.5rem auto;padding:0 1rem;display:grid;gap:1rem}
article{background:#fff;border-radius:.5rem;padding:1rem 1.25rem;box-shadow:0 1px 3px rgba(0,0,0,.1)}
article h2{margin:.4rem 0;font-size:1.2rem}
article h2 a{color:inherit;text-decoration:none}
.badge{display:inline-block;font-size:.75rem;padding:.1rem .5rem;border-radius:1rem;background:#e8f5e9;color:#2e7d32}
.badge.new{background:#ffb300;color:#000;margin-left:.4rem}
time{font-size:.8rem;color:#667}
";

/// "Last updated" stamp in Prague local time.
pub fn last_update_display(now: DateTime<Utc>) -> String {
    now.with_timezone(&Prague).format(DISPLAY_FORMAT).to_string()
}

/// Writes the static page for the sorted collection.
pub struct PageRenderer {
    output_path: PathBuf,
}

impl PageRenderer {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn render(&self, records: &[CuratedRecord], last_update: &str) -> Result<()> {
        let html = render_page(records, last_update);
        fs::write(&self.output_path, html)?;
        info!("Page written to {}", self.output_path.display());
        Ok(())
    }
}

pub fn render_page(records: &[CuratedRecord], last_update: &str) -> String {
    let mut html = String::with_capacity(4096 + records.len() * 512);

    html.push_str("<!DOCTYPE html>\n<html lang=\"cs\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Dobré zprávy</title>\n");
    let _ = writeln!(html, "<style>\n{}</style>", STYLE);
    html.push_str("</head>\n<body>\n<header>\n<h1>Dobré zprávy</h1>\n");
    let _ = writeln!(html, "<p>Aktualizováno: {}</p>", encode_text(last_update));
    html.push_str("</header>\n<main>\n");

    if records.is_empty() {
        html.push_str("<p>Zatím žádné zprávy.</p>\n");
    }

    for record in records {
        write_card(&mut html, record);
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn write_card(html: &mut String, record: &CuratedRecord) {
    let _ = writeln!(
        html,
        "<article data-category=\"{}\">",
        category_slug(&record.category)
    );
    let _ = write!(html, "<span class=\"badge\">{}</span>", encode_text(record.category.label()));
    if record.is_new {
        html.push_str("<span class=\"badge new\">NOVÉ</span>");
    }
    html.push('\n');
    let _ = writeln!(
        html,
        "<h2><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></h2>",
        encode_double_quoted_attribute(&record.link),
        encode_text(&record.title)
    );
    let _ = writeln!(html, "<p>{}</p>", encode_text(&record.summary));
    let _ = writeln!(
        html,
        "<time datetime=\"{}\">{}</time>",
        encode_double_quoted_attribute(&record.timestamp),
        encode_text(&record.timestamp_display)
    );
    html.push_str("</article>\n");
}

fn category_slug(category: &Category) -> &'static str {
    match category {
        Category::Science => "science",
        Category::Technology => "technology",
        Category::Medicine => "medicine",
        Category::Business => "business",
        Category::Society => "society",
        Category::Other(_) => "other",
    }
}
