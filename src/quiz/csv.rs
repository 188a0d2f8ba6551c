//! Parsing of the vocabulary spreadsheet export.

use log::{debug, error};

use crate::quiz::{QuizError, VocabularyRecord};

pub const WORD_COLUMN: &str = "Word";
pub const MEANING_COLUMN: &str = "Meaning (Full)";
pub const PRONUNCIATION_COLUMN: &str = "Pronunciation";
pub const AUDIO_COLUMN: &str = "Audio";

struct Columns {
    word: usize,
    meaning: usize,
    pronunciation: Option<usize>,
    audio: Option<usize>,
}

impl Columns {
    fn locate(header_line: &str) -> Result<Self, QuizError> {
        let headers = header_line.split(',').map(clean_field).collect::<Vec<_>>();
        let find = |name: &str| headers.iter().position(|h| h == name);

        let required = |name: &str| {
            find(name).ok_or_else(|| {
                error!("CSV header '{}' not found in {:?}", name, headers);
                QuizError::MalformedSchema {
                    missing: name.to_string(),
                }
            })
        };

        Ok(Self {
            word: required(WORD_COLUMN)?,
            meaning: required(MEANING_COLUMN)?,
            pronunciation: find(PRONUNCIATION_COLUMN),
            audio: find(AUDIO_COLUMN),
        })
    }

    fn record(&self, line: &str) -> Option<VocabularyRecord> {
        let values = split_fields(line);
        if values.len() <= self.word.max(self.meaning) {
            return None;
        }

        let field = |index: Option<usize>| {
            index
                .and_then(|i| values.get(i))
                .map(|v| clean_field(v))
                .unwrap_or_default()
        };

        let word = field(Some(self.word));
        let meaning = field(Some(self.meaning));
        if word.is_empty() || meaning.is_empty() {
            return None;
        }

        Some(VocabularyRecord {
            word,
            meaning,
            pronunciation: field(self.pronunciation),
            audio_url: field(self.audio),
        })
    }
}

/// Parses the CSV export into vocabulary records.
///
/// Rows that are too short or lack a word or meaning are skipped.
pub fn parse_vocabulary(text: &str) -> Result<Vec<VocabularyRecord>, QuizError> {
    let mut lines = text.trim().split('\n');
    let columns = Columns::locate(lines.next().unwrap_or_default())?;

    let mut records = Vec::new();
    let mut skipped = 0;
    for line in lines {
        match columns.record(line) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} malformed vocabulary rows", skipped);
    }
    if records.is_empty() {
        error!("No words were parsed from the data source");
        return Err(QuizError::EmptyDataset);
    }

    Ok(records)
}

/// Splits a line on every comma that is followed by an even number of
/// double quotes, so commas inside a quoted field are kept.
pub fn split_fields(line: &str) -> Vec<&str> {
    let total_quotes = line.matches('"').count();
    let mut seen_quotes = 0;
    let mut fields = Vec::new();
    let mut start = 0;

    for (i, ch) in line.char_indices() {
        match ch {
            '"' => seen_quotes += 1,
            ',' if (total_quotes - seen_quotes) % 2 == 0 => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

fn clean_field(raw: &str) -> String {
    raw.trim().replace('"', "")
}
