//! Field predicates.

use crate::error::QueryError;
use crate::store::RecordView;
use crate::types::{Field, MatchMethod};
use regex::Regex;

/// Keyword after compilation.
#[derive(Debug, Clone)]
enum Target {
    Text(String),
    Pattern(Regex),
    Size(u64),
}

/// Compiled predicate over one record field.
///
/// `Size` compared with `Eq`/`Lt`/`Gt` is numeric; any other method renders
/// the size as decimal text first. Text comparisons are on raw bytes.
#[derive(Debug, Clone)]
pub struct Matcher {
    method: MatchMethod,
    field: Field,
    negate: bool,
    target: Target,
}

/// Text of a string field. `Path` is the whole `device:path` key.
pub fn field_text<R: RecordView + ?Sized>(record: &R, field: Field) -> Option<&str> {
    match field {
        Field::Path => Some(record.key()),
        Field::Digest => Some(record.digest()),
        Field::Time => Some(record.modified()),
        Field::Size => None,
    }
}

impl Matcher {
    pub fn new(
        method: MatchMethod,
        field: Field,
        keyword: &str,
        negate: bool,
    ) -> Result<Self, QueryError> {
        let target = match (method, field) {
            (MatchMethod::Regex, _) => {
                // The keyword must stand alone, or a stray `)` escapes the anchors.
                Regex::new(keyword)?;
                Target::Pattern(Regex::new(&format!("^(?:{})$", keyword))?)
            }
            (MatchMethod::Eq | MatchMethod::Lt | MatchMethod::Gt, Field::Size) => Target::Size(
                keyword
                    .trim()
                    .parse()
                    .map_err(|_| QueryError::InvalidSize(keyword.to_string()))?,
            ),
            _ => Target::Text(keyword.to_string()),
        };
        Ok(Matcher {
            method,
            field,
            negate,
            target,
        })
    }

    pub fn method(&self) -> MatchMethod {
        self.method
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// Predicate result, flipped when negated.
    pub fn matches<R: RecordView + ?Sized>(&self, record: &R) -> bool {
        self.predicate(record) != self.negate
    }

    fn predicate<R: RecordView + ?Sized>(&self, record: &R) -> bool {
        if let Target::Size(wanted) = self.target {
            let size = record.size();
            return match self.method {
                MatchMethod::Eq => size == wanted,
                MatchMethod::Lt => size < wanted,
                MatchMethod::Gt => size > wanted,
                _ => false,
            };
        }
        match field_text(record, self.field) {
            Some(text) => self.match_text(text),
            None => self.match_text(&record.size().to_string()),
        }
    }

    fn match_text(&self, text: &str) -> bool {
        match &self.target {
            Target::Pattern(pattern) => pattern.is_match(text),
            Target::Size(_) => false,
            Target::Text(keyword) => {
                let (text, keyword) = (text.as_bytes(), keyword.as_bytes());
                match self.method {
                    MatchMethod::Contain => contains(text, keyword),
                    // starts_with/ends_with are false when keyword is longer
                    MatchMethod::StartWith => text.starts_with(keyword),
                    MatchMethod::EndWith => text.ends_with(keyword),
                    MatchMethod::Eq => text == keyword,
                    MatchMethod::Lt => text < keyword,
                    MatchMethod::Gt => text > keyword,
                    MatchMethod::Regex => false,
                }
            }
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
