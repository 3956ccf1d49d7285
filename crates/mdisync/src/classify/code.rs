use std::collections::HashMap;

use crate::config::ProjectConfig;
use crate::NOT_AVAILABLE;

/// How the discipline part of a [`Classification`] was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisciplineMatch {
    /// The lookup character was found in the discipline map.
    Matched(char),
    /// A lookup character was derived but the map has no entry for it.
    UnknownCode(char),
    /// Neither naming rule produced a lookup character.
    NoLookupChar,
    /// Classification was intentionally skipped (transmittal files).
    Skipped,
}

/// Result of classifying a base filename.
///
/// Unresolved parts are `"N/A"`; [`Classification::is_classified`] and
/// `source` tell callers whether the discipline came from the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub table: String,
    pub description: String,
    pub discipline: String,
    pub revision: String,
    pub source: DisciplineMatch,
}

impl Classification {
    fn unclassified(revision: String, source: DisciplineMatch) -> Self {
        Self {
            table: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            discipline: NOT_AVAILABLE.to_string(),
            revision,
            source,
        }
    }

    /// Revision only; used for transmittal cover files.
    pub fn revision_only(base_name: &str) -> Self {
        Self::unclassified(parse_revision(base_name), DisciplineMatch::Skipped)
    }

    pub fn is_classified(&self) -> bool {
        matches!(self.source, DisciplineMatch::Matched(_))
    }
}

#[derive(Debug, Clone)]
struct DisciplineInfo {
    table: String,
    description: String,
    discipline: String,
}

/// Maps a base filename to `(table, description, discipline, revision)`.
///
/// Best effort: never fails, ambiguous input resolves to `"N/A"`.
#[derive(Debug, Clone)]
pub struct CodeClassifier {
    disciplines: HashMap<char, DisciplineInfo>,
    project_prefix: String,
    lookup_offset: usize,
}

impl CodeClassifier {
    pub fn new(config: &ProjectConfig) -> Self {
        let mut disciplines = HashMap::new();
        for (code, entry) in &config.discipline_map {
            let Some(key) = code.chars().next() else {
                continue;
            };
            let field = |i: usize| {
                entry
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            };
            disciplines.insert(
                normalize_key(key),
                DisciplineInfo {
                    table: field(0),
                    description: field(1),
                    discipline: field(2),
                },
            );
        }

        Self {
            disciplines,
            project_prefix: config.naming.project_prefix.clone(),
            lookup_offset: config.naming.lookup_offset,
        }
    }

    pub fn classify(&self, base_name: &str) -> Classification {
        let revision = parse_revision(base_name);

        let Some(lookup) = self.lookup_char(base_name) else {
            return Classification::unclassified(revision, DisciplineMatch::NoLookupChar);
        };

        match self.disciplines.get(&normalize_key(lookup)) {
            Some(info) => Classification {
                table: info.table.clone(),
                description: info.description.clone(),
                discipline: info.discipline.clone(),
                revision,
                source: DisciplineMatch::Matched(lookup),
            },
            None => Classification::unclassified(revision, DisciplineMatch::UnknownCode(lookup)),
        }
    }

    /// Picks the character that identifies the discipline.
    ///
    /// 1. `<project_prefix>` followed by a non-digit at `lookup_offset`.
    /// 2. Otherwise the first non-digit of the second `-` segment.
    fn lookup_char(&self, base_name: &str) -> Option<char> {
        if base_name.starts_with(&self.project_prefix) {
            if let Some(c) = base_name.chars().nth(self.lookup_offset) {
                if !c.is_ascii_digit() {
                    return Some(c);
                }
            }
        }

        base_name
            .split('-')
            .nth(1)
            .and_then(|segment| segment.chars().find(|c| !c.is_ascii_digit()))
    }
}

fn normalize_key(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// First single-character alphanumeric `_` segment, uppercased.
pub fn parse_revision(base_name: &str) -> String {
    base_name
        .split('_')
        .find_map(|part| {
            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_alphanumeric() => Some(c.to_uppercase().to_string()),
                _ => None,
            }
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
