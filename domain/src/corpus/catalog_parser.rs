//! Catalog parsing from Librarian responses.
//!
//! The Librarian replies with free text that usually embeds a JSON dictionary
//! (in a ```` ```json ```` fence, as the whole reply, or somewhere in the middle).
//! Parsing is lenient: anything that cannot be structured falls back to the
//! directory listing, with the raw reply preserved on the catalog.

use super::catalog::{Catalog, FileEntry};
use super::listing::{DirectoryListing, FileCategory};
use crate::core::string::fenced_block;
use serde_json::Value;

/// Build a [`Catalog`] from the Librarian's reply.
///
/// Entries named in the reply are taken as-is; listed files the reply omits are
/// appended as non-critical entries so the catalog always covers the corpus.
pub fn parse_catalog(listing: &DirectoryListing, response: &str) -> Catalog {
    let Some(json) = extract_json_object(response) else {
        let mut catalog = Catalog::from_listing(listing);
        catalog.raw_response = Some(response.to_string());
        return catalog;
    };

    let mut entries: Vec<FileEntry> = json
        .get("files")
        .and_then(Value::as_array)
        .map(|files| files.iter().filter_map(parse_entry).collect())
        .unwrap_or_default();

    for file in &listing.files {
        if !entries.iter().any(|e| e.name == file.name) {
            entries.push(FileEntry::new(&file.name, file.category));
        }
    }

    let mut catalog = Catalog::new(&listing.directory_path, entries);
    catalog.relationships = string_list(json.get("data_relationships").or(json.get("relationships")));
    catalog.constraints = string_list(json.get("key_constraints").or(json.get("constraints")));
    catalog.usage_guidelines = string_list(json.get("usage_guidelines"));
    catalog
}

/// Locate the first JSON object in a model reply.
pub fn extract_json_object(response: &str) -> Option<Value> {
    if let Some(block) = fenced_block(response, &["json"])
        && let Ok(value @ Value::Object(_)) = serde_json::from_str(block)
    {
        return Some(value);
    }

    if let Ok(value @ Value::Object(_)) = serde_json::from_str(response.trim()) {
        return Some(value);
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&response[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn parse_entry(value: &Value) -> Option<FileEntry> {
    let name = value.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let category = value
        .get("file_type")
        .or(value.get("category"))
        .and_then(Value::as_str)
        .map(|s| s.parse::<FileCategory>().unwrap_or_default())
        .unwrap_or_else(|| {
            let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
            FileCategory::from_extension(ext)
        });

    let mut entry = FileEntry::new(name, category);
    if let Some(format) = value.get("format").and_then(Value::as_str) {
        entry.format = format.to_ascii_lowercase();
    }
    entry.is_critical = match value.get("is_critical") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    };
    entry.summary = value
        .get("summary")
        .map(value_to_text)
        .unwrap_or_default();
    entry.content_details = value.get("content_details").cloned().unwrap_or(Value::Null);
    Some(entry)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![value_to_text(other)],
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
