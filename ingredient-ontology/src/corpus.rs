//! Recipe corpus reader.
//!
//! Reads a recipe CSV whose ingredient column holds a serialized list of
//! quoted strings (`['winter squash', "king's hawaiian rolls"]`) and counts
//! how often each ingredient string appears.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::error::Result;
use crate::store::require_artifacts;

/// Where to find ingredients in the recipe CSV.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Header name of the ingredient list column.
    pub ingredients_column: String,
    /// Column used when no header matches.
    pub fallback_column_index: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            ingredients_column: "ingredients".to_string(),
            fallback_column_index: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub ingredient_mentions: usize,
}

/// Ingredient -> count, remembering the order ingredients were first seen.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
    positions: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs, summing repeated names.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut table = Self::new();
        for (name, count) in pairs {
            table.add(name, count);
        }
        table
    }

    /// Count one more occurrence of `name`.
    pub fn record(&mut self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&mut self, name: &str, count: u64) {
        match self.positions.get(name) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.positions.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), count));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.positions.get(name).map(|&pos| self.entries[pos].1)
    }

    /// Pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read ingredient frequencies from a recipe CSV.
///
/// Rows that are too short or whose ingredient cell does not decode are
/// skipped and counted in `CorpusStats::rows_skipped`.
pub fn read_recipe_corpus(
    path: &Path,
    config: &CorpusConfig,
) -> Result<(FrequencyTable, CorpusStats)> {
    require_artifacts([path])?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == config.ingredients_column)
        .unwrap_or(config.fallback_column_index);
    tracing::debug!(column, "Reading ingredients column");

    let mut table = FrequencyTable::new();
    let mut stats = CorpusStats::default();

    for record in reader.records() {
        stats.rows_read += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::trace!(error = %e, "Skipping malformed row");
                stats.rows_skipped += 1;
                continue;
            }
        };

        let Some(cell) = record.get(column) else {
            stats.rows_skipped += 1;
            continue;
        };
        let ingredients = match decode_list(cell) {
            Ok(list) => list,
            Err(e) => {
                tracing::trace!(error = %e, "Skipping undecodable ingredient list");
                stats.rows_skipped += 1;
                continue;
            }
        };

        for ingredient in ingredients {
            let normalized = ingredient.to_lowercase().trim().to_string();
            if normalized.chars().count() > 1 {
                table.record(&normalized);
                stats.ingredient_mentions += 1;
            }
        }
    }

    tracing::info!(
        rows = stats.rows_read,
        skipped = stats.rows_skipped,
        unique = table.len(),
        "Loaded recipe corpus"
    );
    Ok((table, stats))
}

// =============================================================================
// List decoding
// =============================================================================

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ListDecodeError {
    #[error("expected {expected} at offset {offset}")]
    Expected { expected: &'static str, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid escape at offset {0}")]
    InvalidEscape(usize),
}

/// Decode a serialized list of quoted strings.
///
/// Accepts single- or double-quoted items, backslash escapes (`\\`, `\'`,
/// `\"`, `\n`, `\t`, `\r`, `\xHH`, `\uHHHH`) and a trailing comma.
pub fn decode_list(text: &str) -> std::result::Result<Vec<String>, ListDecodeError> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = skip_ws(&chars, 0);
    let mut items = Vec::new();

    if chars.get(pos) != Some(&'[') {
        return Err(ListDecodeError::Expected {
            expected: "'['",
            offset: pos,
        });
    }
    pos = skip_ws(&chars, pos + 1);

    loop {
        match chars.get(pos) {
            Some(']') => {
                pos += 1;
                break;
            }
            Some(&quote) if quote == '\'' || quote == '"' => {
                let (item, next) = decode_string(&chars, pos)?;
                items.push(item);
                pos = skip_ws(&chars, next);
                match chars.get(pos) {
                    Some(',') => pos = skip_ws(&chars, pos + 1),
                    Some(']') => {}
                    _ => {
                        return Err(ListDecodeError::Expected {
                            expected: "',' or ']'",
                            offset: pos,
                        })
                    }
                }
            }
            _ => {
                return Err(ListDecodeError::Expected {
                    expected: "string or ']'",
                    offset: pos,
                })
            }
        }
    }

    if skip_ws(&chars, pos) != chars.len() {
        return Err(ListDecodeError::Expected {
            expected: "end of input",
            offset: pos,
        });
    }
    Ok(items)
}

fn skip_ws(chars: &[char], mut pos: usize) -> usize {
    while chars.get(pos).is_some_and(|c| c.is_whitespace()) {
        pos += 1;
    }
    pos
}

/// Decode the quoted string starting at `start`; returns it and the offset after the closing quote.
fn decode_string(
    chars: &[char],
    start: usize,
) -> std::result::Result<(String, usize), ListDecodeError> {
    let quote = chars[start];
    let mut out = String::new();
    let mut pos = start + 1;

    loop {
        match chars.get(pos) {
            None => return Err(ListDecodeError::UnterminatedString(start)),
            Some(&c) if c == quote => return Ok((out, pos + 1)),
            Some('\\') => {
                let escape_at = pos;
                let Some(&next) = chars.get(pos + 1) else {
                    return Err(ListDecodeError::UnterminatedString(start));
                };
                pos += 2;
                match next {
                    '\\' | '\'' | '"' => out.push(next),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'x' | 'u' => {
                        let width = if next == 'x' { 2 } else { 4 };
                        let hex: String = chars.iter().skip(pos).take(width).collect();
                        let decoded = (hex.len() == width)
                            .then(|| u32::from_str_radix(&hex, 16).ok())
                            .flatten()
                            .and_then(char::from_u32)
                            .ok_or(ListDecodeError::InvalidEscape(escape_at))?;
                        out.push(decoded);
                        pos += width;
                    }
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            Some(&c) => {
                out.push(c);
                pos += 1;
            }
        }
    }
}
