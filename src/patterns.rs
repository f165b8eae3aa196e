//! Pattern set construction.
//!
//! Patterns come from the command line or from a FASTA pattern file, are
//! optionally expanded from degenerate bases and compiled once before the
//! pipeline starts. The resulting [`PatternSet`] is read-only and shared by
//! every worker.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::bytes::{Regex, RegexBuilder};

use crate::alphabet::{self, SeqType};
use crate::error::{LocateError, Result};
use crate::parallel::Span;
use crate::sequence::{read_all_records, IdExtractor};

/// Compiled regexes larger than this are rejected
const REGEX_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Failure reported by a matcher while scanning a sequence
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MatchFailure(pub String);

/// A compiled motif that can enumerate its matches in a byte sequence
pub trait MotifMatcher: Send + Sync + fmt::Debug {
    /// Append every non-overlapping, non-empty match in `haystack` to `out`,
    /// in `haystack`-local coordinates and ascending order.
    fn find_spans(
        &self,
        haystack: &[u8],
        out: &mut Vec<Span>,
    ) -> std::result::Result<(), MatchFailure>;
}

/// Regex-backed matcher
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(expression: &str) -> std::result::Result<Self, regex::Error> {
        let regex = RegexBuilder::new(expression)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()?;
        Ok(Self { regex })
    }
}

impl MotifMatcher for RegexMatcher {
    fn find_spans(
        &self,
        haystack: &[u8],
        out: &mut Vec<Span>,
    ) -> std::result::Result<(), MatchFailure> {
        out.extend(
            self.regex
                .find_iter(haystack)
                .map(|m| Span::new(m.start(), m.end()))
                .filter(|span| !span.is_empty()),
        );
        Ok(())
    }
}

/// One named motif
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: String,
    /// Pattern text as given by the user, reported in the output
    pub raw: Vec<u8>,
    /// Expression actually compiled
    pub expression: String,
    pub case_insensitive: bool,
    pub matcher: Arc<dyn MotifMatcher>,
}

impl Pattern {
    pub fn raw_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

/// Immutable, insertion-ordered mapping from pattern name to pattern
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: IndexMap<String, Pattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pattern; returns true when it replaced one with the same name
    pub fn insert(&mut self, pattern: Pattern) -> bool {
        self.patterns.insert(pattern.name.clone(), pattern).is_some()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    /// Pattern by position in set order
    pub fn get_index(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get_index(index).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.values()
    }
}

impl FromIterator<Pattern> for PatternSet {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        let mut set = PatternSet::new();
        for pattern in iter {
            set.insert(pattern);
        }
        set
    }
}

/// Where patterns come from
#[derive(Debug, Clone)]
pub enum PatternSource {
    Literals(Vec<String>),
    File(PathBuf),
}

/// Options applied to every pattern while compiling
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternOptions {
    pub degenerate: bool,
    pub ignore_case: bool,
    pub seq_type: SeqType,
}

/// Builds a [`PatternSet`] from a [`PatternSource`]
#[derive(Debug, Clone, Default)]
pub struct PatternSetBuilder {
    options: PatternOptions,
}

impl PatternSetBuilder {
    pub fn new(options: PatternOptions) -> Self {
        Self { options }
    }

    pub fn build(&self, source: &PatternSource) -> Result<PatternSet> {
        let entries: Vec<(String, Vec<u8>)> = match source {
            PatternSource::Literals(literals) => literals
                .iter()
                .map(|p| (p.clone(), p.as_bytes().to_vec()))
                .collect(),
            PatternSource::File(path) => read_all_records(path, IdExtractor::default())
                .map_err(|e| {
                    LocateError::config(format!(
                        "cannot read pattern file '{}': {}",
                        path.display(),
                        e
                    ))
                })?
                .into_iter()
                .map(|record| (record.id, record.seq))
                .collect(),
        };

        if entries.is_empty() {
            return Err(LocateError::config("no patterns given"));
        }

        let mut set = PatternSet::new();
        for (name, raw) in entries {
            let pattern = self.compile(name, raw)?;
            log::debug!(
                "compiled pattern '{}' as /{}/",
                pattern.name,
                pattern.expression
            );
            let name = pattern.name.clone();
            if set.insert(pattern) {
                log::warn!("pattern '{}' defined more than once, keeping the last", name);
            }
        }
        log::info!("compiled {} pattern(s)", set.len());
        Ok(set)
    }

    /// Turn one raw pattern into a compiled [`Pattern`]
    pub fn compile(&self, name: String, raw: Vec<u8>) -> Result<Pattern> {
        if raw.is_empty() {
            return Err(LocateError::config(format!("pattern '{}' is empty", name)));
        }

        let mut expression = if self.options.degenerate {
            if let Some(bad) = self.options.seq_type.first_invalid(&raw) {
                return Err(LocateError::config(format!(
                    "pattern '{}' contains '{}' which is not a valid {} letter; \
                     degenerate mode expects sequences, not regular expressions",
                    name,
                    bad.escape_ascii(),
                    self.options.seq_type.resolve(&raw).name()
                )));
            }
            alphabet::degenerate_to_regex(self.options.seq_type, &raw)
        } else {
            String::from_utf8_lossy(&raw).into_owned()
        };

        if self.options.ignore_case {
            expression.insert_str(0, "(?i)");
        }

        let matcher = RegexMatcher::new(&expression).map_err(|e| LocateError::PatternCompile {
            name: name.clone(),
            expression: expression.clone(),
            message: e.to_string(),
        })?;

        Ok(Pattern {
            name,
            raw,
            expression,
            case_insensitive: self.options.ignore_case,
            matcher: Arc::new(matcher),
        })
    }
}
