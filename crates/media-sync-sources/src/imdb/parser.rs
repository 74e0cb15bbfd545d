use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, StringRecord};
use media_sync_models::{Item, MediaIds, MediaType};
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// Column positions of an IMDb export, looked up by header name
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord, required: &[&str]) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').to_string(), i))
            .collect();

        for col in required {
            if !index.contains_key(*col) {
                let available: Vec<&str> = headers.iter().collect();
                return Err(anyhow!(
                    "Missing required column: {}. Available columns: {:?}",
                    col,
                    available
                ));
            }
        }
        Ok(Self { index })
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Parse an IMDb list export (also used for the watchlist)
pub fn parse_list_csv<R: Read>(input: R) -> Result<Vec<Item>> {
    let mut reader = Reader::from_reader(input);
    let columns = Columns::from_headers(&reader.headers()?.clone(), &["Const", "Title Type"])?;

    let mut items = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let Some(mut item) = parse_item(&columns, &record, row + 1) else {
            continue;
        };
        let created = columns.get(&record, "Created");
        if !created.is_empty() {
            item.listed_at = Some(parse_export_date(created)?);
        }
        items.push(item);
    }

    debug!(items = items.len(), "Parsed IMDb list export");
    Ok(items)
}

/// Parse an IMDb ratings export
pub fn parse_ratings_csv<R: Read>(input: R) -> Result<Vec<Item>> {
    let mut reader = Reader::from_reader(input);
    let columns = Columns::from_headers(
        &reader.headers()?.clone(),
        &["Const", "Title Type", "Your Rating", "Date Rated"],
    )?;

    let mut ratings = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let Some(item) = parse_item(&columns, &record, row + 1) else {
            continue;
        };

        let rating_str = columns.get(&record, "Your Rating");
        let rating: u8 = rating_str
            .parse()
            .map_err(|e| anyhow!("Invalid rating '{}' for {:?}: {}", rating_str, item.ids.imdb_id, e))?;
        if !(1..=10).contains(&rating) {
            return Err(anyhow!("Rating {} for {:?} is outside 1-10", rating, item.ids.imdb_id));
        }
        let rated_at = parse_export_date(columns.get(&record, "Date Rated"))?;

        ratings.push(item.with_rating(rating, rated_at));
    }

    debug!(ratings = ratings.len(), "Parsed IMDb ratings export");
    Ok(ratings)
}

fn parse_item(columns: &Columns, record: &StringRecord, row: usize) -> Option<Item> {
    let imdb_id = columns.get(record, "Const");
    if imdb_id.is_empty() {
        debug!(row, "Skipping row with empty IMDb id");
        return None;
    }

    let title_type = columns.get(record, "Title Type");
    let Some(media_type) = MediaType::from_imdb_title_type(title_type) else {
        debug!(row, imdb_id, title_type, "Skipping row with unsupported title type");
        return None;
    };

    let title = columns.get(record, "Title");
    Some(Item {
        ids: MediaIds::from_imdb(imdb_id),
        media_type,
        title: (!title.is_empty()).then(|| title.to_string()),
        year: columns.get(record, "Year").parse().ok(),
        rating: None,
        rated_at: None,
        listed_at: None,
    })
}

/// Export dates are `YYYY-MM-DD`; older exports carry a full RFC 2822 stamp.
fn parse_export_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("Failed to create time from date '{}'", value))?;
        return Ok(midnight.and_utc());
    }
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", value, e))
}

#[cfg(test)]
mod tests;
