use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open interval `[low, high)` on one predictor axis.
///
/// Either end may be infinite; an infinite end always admits the values on its side,
/// so `(-inf, x)` contains `-inf` and `(x, inf)` contains `inf`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "RangeTokens", try_from = "RangeTokens")]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub const FULL: Interval = Interval {
        low: f64::NEG_INFINITY,
        high: f64::INFINITY,
    };

    /// Builds an interval, rejecting NaN bounds and `low >= high`.
    pub fn new(low: f64, high: f64) -> Result<Self, String> {
        if low.is_nan() || high.is_nan() {
            return Err(format!("bound pair ({low}, {high}) is not comparable"));
        }
        if low >= high {
            return Err(format!("low bound {low} is not below high bound {high}"));
        }
        Ok(Interval { low, high })
    }

    /// Parses a pair of bound tokens such as `("-inf", "0.25")`.
    pub fn parse(low: &str, high: &str) -> Result<Self, String> {
        Interval::new(parse_bound(low)?, parse_bound(high)?)
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        let above_low = self.low == f64::NEG_INFINITY || value >= self.low;
        let below_high = self.high == f64::INFINITY || value < self.high;
        above_low && below_high
    }

    pub fn is_full(&self) -> bool {
        *self == Interval::FULL
    }

    /// Formats the interval as a node label, e.g. `5 < wspd < 20`.
    pub fn label(&self, predictor: &str) -> String {
        format!("{} < {} < {}", self.low, predictor, self.high)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}

/// Parses a bound token: a number, or `inf` / `-inf` / `infinity` in any case.
pub fn parse_bound(token: &str) -> Result<f64, String> {
    let trimmed = token.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => Err(format!("bound {trimmed:?} is not comparable")),
        Ok(v) => Ok(v),
        Err(_) => Err(format!("cannot parse bound {trimmed:?}")),
    }
}

/// Bound as it appears in JSON: infinities are spelled out as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum BoundToken {
    Number(f64),
    Text(String),
}

impl BoundToken {
    fn from_value(value: f64) -> Self {
        if value.is_infinite() {
            BoundToken::Text(value.to_string())
        } else {
            BoundToken::Number(value)
        }
    }

    fn value(&self) -> Result<f64, String> {
        match self {
            BoundToken::Number(v) => Ok(*v),
            BoundToken::Text(s) => parse_bound(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RangeTokens(BoundToken, BoundToken);

impl From<Interval> for RangeTokens {
    fn from(interval: Interval) -> Self {
        RangeTokens(
            BoundToken::from_value(interval.low),
            BoundToken::from_value(interval.high),
        )
    }
}

impl TryFrom<RangeTokens> for Interval {
    type Error = String;

    fn try_from(tokens: RangeTokens) -> Result<Self, Self::Error> {
        Interval::new(tokens.0.value()?, tokens.1.value()?)
    }
}
