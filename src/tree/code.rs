use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Largest sibling rank that fits in one code digit.
pub const MAX_BRANCHES: usize = 9;

/// Fixed-width node code, one digit per predictor level.
///
/// `0` marks a level that is undecided on the path to the node; any other digit is
/// the 1-based rank of the branch taken at that level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Code(Vec<u8>);

impl Code {
    pub fn root(width: usize) -> Self {
        Code(vec![0; width])
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn digit(&self, level: usize) -> u8 {
        self.0[level]
    }

    pub fn digits(&self) -> &[u8] {
        &self.0
    }

    /// Copy of this code with `level` set to `rank`.
    pub(crate) fn with_rank(&self, level: usize, rank: usize) -> Self {
        debug_assert!((1..=MAX_BRANCHES).contains(&rank));
        let mut digits = self.0.clone();
        digits[level] = rank as u8;
        Code(digits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &d in &self.0 {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| {
                c.to_digit(10)
                    .map(|d| d as u8)
                    .ok_or_else(|| format!("invalid code digit {c:?} in {s:?}"))
            })
            .collect::<Result<Vec<u8>, String>>()
            .map(Code)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}

impl TryFrom<String> for Code {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
