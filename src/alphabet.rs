//! Sequence alphabets, degenerate-base expansion and reverse complement.
//!
//! Degenerate (IUPAC) codes are expanded into bracket classes so that a
//! pattern such as `ACNR` becomes the regular expression `AC[ACGT][AG]`.

use once_cell::sync::Lazy;

/// Sequence type of patterns and records
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeqType {
    /// Guess from the pattern itself
    #[default]
    Auto,
    Dna,
    Rna,
    Protein,
}

const NUCLEOTIDE_AMBIGUITY: &[u8] = b"NRYSWKMBDHV";
const GAPS: &[u8] = b"-.";

static DNA_LETTERS: Lazy<[bool; 256]> =
    Lazy::new(|| letter_table(&[b"ACGT", NUCLEOTIDE_AMBIGUITY, GAPS]));
static RNA_LETTERS: Lazy<[bool; 256]> =
    Lazy::new(|| letter_table(&[b"ACGU", NUCLEOTIDE_AMBIGUITY, GAPS]));
static PROTEIN_LETTERS: Lazy<[bool; 256]> = Lazy::new(|| {
    letter_table(&[b"ACDEFGHIKLMNPQRSTVWY", b"BZJXUO", b"*", GAPS])
});

/// Build a case-insensitive membership table
fn letter_table(groups: &[&[u8]]) -> [bool; 256] {
    let mut table = [false; 256];
    for group in groups {
        for &b in group.iter() {
            table[b.to_ascii_uppercase() as usize] = true;
            table[b.to_ascii_lowercase() as usize] = true;
        }
    }
    table
}

impl SeqType {
    /// Resolve `Auto` by looking at the sequence
    pub fn resolve(self, seq: &[u8]) -> SeqType {
        match self {
            SeqType::Auto => Self::guess(seq),
            other => other,
        }
    }

    /// Guess the alphabet of a sequence: nucleotides win when every byte fits
    pub fn guess(seq: &[u8]) -> SeqType {
        let has_u = seq.iter().any(|b| b.eq_ignore_ascii_case(&b'U'));
        let has_t = seq.iter().any(|b| b.eq_ignore_ascii_case(&b'T'));
        if !has_u && seq.iter().all(|&b| DNA_LETTERS[b as usize]) {
            SeqType::Dna
        } else if !has_t && seq.iter().all(|&b| RNA_LETTERS[b as usize]) {
            SeqType::Rna
        } else {
            SeqType::Protein
        }
    }

    /// Return the first byte not allowed in this alphabet
    pub fn first_invalid(self, seq: &[u8]) -> Option<u8> {
        let table: &[bool; 256] = match self.resolve(seq) {
            SeqType::Dna => &*DNA_LETTERS,
            SeqType::Rna => &*RNA_LETTERS,
            SeqType::Protein | SeqType::Auto => &*PROTEIN_LETTERS,
        };
        seq.iter().copied().find(|&b| !table[b as usize])
    }

    pub fn name(self) -> &'static str {
        match self {
            SeqType::Auto => "auto",
            SeqType::Dna => "DNA",
            SeqType::Rna => "RNA",
            SeqType::Protein => "protein",
        }
    }
}

/// Bracket class for a nucleotide ambiguity code, upper-case form
fn nucleotide_class(code: u8, thymine: u8) -> Option<String> {
    let t = thymine as char;
    let class = match code {
        b'R' => "AG".to_string(),
        b'Y' => format!("C{t}"),
        b'S' => "CG".to_string(),
        b'W' => format!("A{t}"),
        b'K' => format!("G{t}"),
        b'M' => "AC".to_string(),
        b'B' => format!("CG{t}"),
        b'D' => format!("AG{t}"),
        b'H' => format!("AC{t}"),
        b'V' => "ACG".to_string(),
        b'N' => format!("ACG{t}"),
        _ => return None,
    };
    Some(class)
}

fn protein_class(code: u8) -> Option<&'static str> {
    match code {
        b'B' => Some("DN"),
        b'Z' => Some("EQ"),
        b'J' => Some("IL"),
        b'X' => Some("A-Z"),
        _ => None,
    }
}

/// Expand degenerate codes of `seq` into an equivalent regular expression.
///
/// Lower-case codes expand to lower-case classes. Bytes without an
/// expansion are emitted as escaped literals.
pub fn degenerate_to_regex(seq_type: SeqType, seq: &[u8]) -> String {
    let seq_type = seq_type.resolve(seq);
    let mut expr = String::with_capacity(seq.len() * 2);
    for &b in seq {
        let upper = b.to_ascii_uppercase();
        let class = match seq_type {
            SeqType::Dna => nucleotide_class(upper, b'T'),
            SeqType::Rna => nucleotide_class(upper, b'U'),
            SeqType::Protein | SeqType::Auto => protein_class(upper).map(str::to_string),
        };
        match class {
            Some(class) => {
                let class = if b.is_ascii_lowercase() {
                    class.to_ascii_lowercase()
                } else {
                    class
                };
                expr.push('[');
                expr.push_str(&class);
                expr.push(']');
            }
            None => expr.push_str(&regex::escape(&(b as char).to_string())),
        }
    }
    expr
}

/// Complement a single base, IUPAC aware and case preserving
#[inline]
pub const fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'a' => b't',
        b't' | b'u' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        b'r' => b'y',
        b'y' => b'r',
        b'k' => b'm',
        b'm' => b'k',
        b'b' => b'v',
        b'v' => b'b',
        b'd' => b'h',
        b'h' => b'd',
        // S, W, N and gaps are their own complement
        _ => base,
    }
}

/// Reverse complement a sequence buffer
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement_base(b)).collect()
}
