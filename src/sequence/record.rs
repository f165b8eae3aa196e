use regex::bytes::Regex;

use crate::alphabet;
use crate::error::{LocateError, Result};

/// Default record ID expression: the first whitespace-delimited token
pub const DEFAULT_ID_REGEXP: &str = r"^(\S+)\s?";

/// A decoded sequence record, immutable once read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

impl SeqRecord {
    pub fn new(id: impl Into<String>, seq: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            seq: seq.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn reverse_complement(&self) -> Vec<u8> {
        alphabet::reverse_complement(&self.seq)
    }
}

/// Extracts record identifiers from header lines with a one-group regex
#[derive(Debug, Clone)]
pub struct IdExtractor {
    regex: Regex,
}

impl IdExtractor {
    pub fn new(expression: &str) -> Result<Self> {
        let regex = Regex::new(expression).map_err(|e| {
            LocateError::config(format!("invalid ID regular expression '{}': {}", expression, e))
        })?;
        // captures_len counts the implicit whole-match group
        if regex.captures_len() < 2 {
            return Err(LocateError::config(format!(
                "ID regular expression '{}' must contain a capture group",
                expression
            )));
        }
        Ok(Self { regex })
    }

    /// Extract the ID from a header (without the leading '>' or '@').
    /// Falls back to the whole header when the expression does not match.
    pub fn extract(&self, head: &[u8]) -> String {
        let id = self
            .regex
            .captures(head)
            .and_then(|caps| caps.get(1))
            .map_or(head, |m| m.as_bytes());
        String::from_utf8_lossy(id).into_owned()
    }
}

impl Default for IdExtractor {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_ID_REGEXP).expect("default ID regexp is valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extractor_takes_first_token() {
        let extractor = IdExtractor::default();
        assert_eq!(extractor.extract(b"chr1 some description"), "chr1");
        assert_eq!(extractor.extract(b"read/1"), "read/1");
    }

    #[test]
    fn test_custom_extractor() -> Result<()> {
        let extractor = IdExtractor::new(r"\|([^|]+)\|")?;
        assert_eq!(extractor.extract(b"sp|P69905|HBA_HUMAN"), "P69905");
        // No match keeps the whole header
        assert_eq!(extractor.extract(b"plain"), "plain");
        Ok(())
    }

    #[test]
    fn test_extractor_requires_group() {
        let err = IdExtractor::new(r"^\S+").unwrap_err();
        assert!(matches!(err, LocateError::Config(_)));
    }

    #[test]
    fn test_extractor_rejects_invalid_regex() {
        assert!(IdExtractor::new("(unclosed").is_err());
    }

    #[test]
    fn test_record_reverse_complement() {
        let record = SeqRecord::new("r1", b"AACG".to_vec());
        assert_eq!(record.reverse_complement(), b"CGTT".to_vec());
        assert_eq!(record.len(), 4);
    }
}
