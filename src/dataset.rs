//! Flat tabular datasets: the raw collection file and the normalized
//! output file.
//!
//! The raw file has a fixed seven-column schema. The normalization pass is
//! schema-preserving for everything it does not understand: rows are read
//! as string records against the header, unknown columns pass through
//! untouched, and the output gains exactly one appended `SentimentScore`
//! column.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::RecordTransformer;
use crate::models::RawPost;

/// Raw dataset header, in column order.
pub const RAW_HEADER: [&str; 7] = [
    "Created_At",
    "User",
    "Tweet",
    "Location",
    "Coordinates",
    "Retweet_Count",
    "Favorite_Count",
];

/// Accepted names for the text column, in resolution order.
pub const TEXT_COLUMN_ALIASES: [&str; 4] = ["Tweet", "tweet", "text", "Text"];

/// Accepted names for the location column, in resolution order.
pub const LOCATION_COLUMN_ALIASES: [&str; 2] = ["Location", "location"];

/// Column appended by the normalization pass.
pub const SENTIMENT_COLUMN: &str = "SentimentScore";

/// Dataset failures. Everything here is fatal for the stage it occurs in;
/// per-row problems are handled inline by skip-and-log instead.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(
        "no recognized text column (expected one of {}); columns found: {available}",
        TEXT_COLUMN_ALIASES.join(", ")
    )]
    MissingTextColumn { available: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write collected posts to the raw CSV file.
pub fn write_raw_posts(path: &Path, posts: &[RawPost]) -> Result<(), DatasetError> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(RAW_HEADER)?;

    for post in posts {
        let coordinates = post.coordinates.map(|c| c.to_cell()).unwrap_or_default();
        let retweets = post.retweet_count.to_string();
        let favorites = post.favorite_count.to_string();
        writer.write_record([
            post.created_at.as_str(),
            post.author.as_str(),
            post.text.as_str(),
            post.location.as_deref().unwrap_or(""),
            coordinates.as_str(),
            retweets.as_str(),
            favorites.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Outcome of a normalization pass.
#[derive(Debug)]
pub struct NormalizeReport {
    /// Which alias the text column resolved to.
    pub text_column: String,
    /// Rows written to the output file.
    pub rows: usize,
    /// Rows dropped because they could not be read.
    pub skipped: usize,
}

/// Resolve a column index from an ordered alias list.
fn resolve_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == *alias))
}

/// Run the normalization pass: read the raw CSV, transform each row, and
/// write the output CSV with an appended [`SENTIMENT_COLUMN`].
///
/// The input is decoded lossily so arbitrary byte content cannot abort the
/// run; unreadable rows are skipped and logged. A missing text column is
/// fatal since there is no safe default to assume.
pub fn normalize_file(
    input: &Path,
    output: &Path,
    transformer: &RecordTransformer,
) -> Result<NormalizeReport, DatasetError> {
    let bytes = std::fs::read(input)?;
    let content = String::from_utf8_lossy(&bytes);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    info!("Input columns: {}", headers.iter().collect::<Vec<_>>().join(", "));

    let text_idx = resolve_column(&headers, &TEXT_COLUMN_ALIASES).ok_or_else(|| {
        DatasetError::MissingTextColumn {
            available: headers.iter().collect::<Vec<_>>().join(", "),
        }
    })?;
    let location_idx = resolve_column(&headers, &LOCATION_COLUMN_ALIASES);
    let hashtags_idx = headers.iter().position(|h| h == "hashtags");

    info!("Using text column '{}'", &headers[text_idx]);

    let mut writer = WriterBuilder::new().from_path(output)?;
    let mut out_header: Vec<&str> = headers.iter().collect();
    out_header.push(SENTIMENT_COLUMN);
    writer.write_record(&out_header)?;

    let mut rows = 0usize;
    let mut skipped = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping unreadable row {}: {}", line + 2, e);
                skipped += 1;
                continue;
            }
        };

        // Pad or truncate to the header width so ragged rows stay usable.
        let mut cells: Vec<String> = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();

        let text = cells[text_idx].clone();
        let sentiment = if text.is_empty() {
            String::new()
        } else {
            let cleaned = transformer.clean_text(&text);
            let score = transformer.score_text(&cleaned);
            cells[text_idx] = cleaned;
            score.to_string()
        };

        if let Some(idx) = location_idx {
            let raw_location = cells[idx].clone();
            cells[idx] = transformer.classify_location(Some(&raw_location));
        }

        if let Some(idx) = hashtags_idx {
            if idx != text_idx {
                let raw_tags = cells[idx].clone();
                cells[idx] = transformer.clean_text(&raw_tags);
            }
        }

        cells.push(sentiment);
        writer.write_record(&cells)?;
        rows += 1;
    }

    writer.flush()?;

    Ok(NormalizeReport {
        text_column: headers[text_idx].to_string(),
        rows,
        skipped,
    })
}
