//! DNA base utilities: complement, reversal, palindrome check and validation

use bio::alphabets::{dna, Alphabet};
use once_cell::sync::Lazy;

use super::error::{Result, ThermoError};

/// Standard DNA bases
pub const STANDARD_BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Strict uppercase ACGT alphabet used for the fast validation path.
static ACGT: Lazy<Alphabet> = Lazy::new(|| Alphabet::new(b"ACGT"));

/// Check if a character is a standard DNA base
pub fn is_standard_base(c: char) -> bool {
    matches!(c, 'A' | 'C' | 'G' | 'T')
}

/// Complement of a single base byte, `position` is only used for error reporting.
#[inline]
pub(crate) fn complement_byte(b: u8, position: usize) -> Result<u8> {
    match b {
        b'A' => Ok(b'T'),
        b'T' => Ok(b'A'),
        b'G' => Ok(b'C'),
        b'C' => Ok(b'G'),
        other => Err(ThermoError::InvalidBase {
            base: other as char,
            position,
        }),
    }
}

/// Complement of a single base (A<->T, G<->C).
pub fn complement_base(base: char) -> Result<char> {
    match base {
        'A' => Ok('T'),
        'T' => Ok('A'),
        'G' => Ok('C'),
        'C' => Ok('G'),
        other => Err(ThermoError::InvalidBase {
            base: other,
            position: 0,
        }),
    }
}

/// Make sure every character of `seq` is one of A, C, G, T.
pub fn validate_sequence(seq: &str) -> Result<()> {
    if ACGT.is_word(seq.as_bytes()) {
        return Ok(());
    }
    match seq.chars().enumerate().find(|&(_, c)| !is_standard_base(c)) {
        Some((position, base)) => Err(ThermoError::InvalidBase { base, position }),
        None => Ok(()),
    }
}

/// Complement every base, preserving order and length.
pub fn complement_sequence(seq: &str) -> Result<String> {
    seq.chars()
        .enumerate()
        .map(|(i, c)| {
            complement_base(c).map_err(|_| ThermoError::InvalidBase {
                base: c,
                position: i,
            })
        })
        .collect()
}

/// Reverse the order of the bases.
pub fn reverse_sequence(seq: &str) -> String {
    seq.chars().rev().collect()
}

/// Compute the reverse complement of a DNA sequence
pub fn reverse_complement(seq: &str) -> Result<String> {
    validate_sequence(seq)?;
    let rc = dna::revcomp(seq.as_bytes());
    Ok(rc.into_iter().map(char::from).collect())
}

/// True if the complement of `seq` equals its reversal (e.g. the EcoRI site `GAATTC`).
pub fn is_palindromic(seq: &str) -> Result<bool> {
    validate_sequence(seq)?;
    Ok(dna::revcomp(seq.as_bytes()) == seq.as_bytes())
}
