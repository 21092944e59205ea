//! # Denominations
//!
//! The set of cash values the machine accepts, validated once at load time.
//!
//! A `Denominations` value is always non-empty, contains only positive
//! values, has no duplicates, and is stored in descending order. Both
//! consumers rely on that: the purchase check does a membership test and
//! the change calculator walks the values largest first.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Accepted cash values in the smallest currency unit, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct Denominations(Vec<i64>);

impl Denominations {
    /// Builds a validated set from any ordering of values.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::denomination::Denominations;
    ///
    /// let d = Denominations::new([5, 25, 1, 10]).unwrap();
    /// assert_eq!(d.descending(), &[25, 10, 5, 1]);
    ///
    /// assert!(Denominations::new(Vec::new()).is_err());
    /// assert!(Denominations::new([10, 0]).is_err());
    /// assert!(Denominations::new([10, 10]).is_err());
    /// ```
    pub fn new(values: impl IntoIterator<Item = i64>) -> Result<Self, ValidationError> {
        let mut values: Vec<i64> = values.into_iter().collect();

        if values.is_empty() {
            return Err(ValidationError::Required {
                field: "supported_denominations".to_string(),
            });
        }

        if let Some(bad) = values.iter().find(|v| **v <= 0) {
            return Err(ValidationError::InvalidFormat {
                field: "supported_denominations".to_string(),
                reason: format!("{} is not a positive amount", bad),
            });
        }

        values.sort_unstable_by(|a, b| b.cmp(a));

        if let Some(pair) = values.windows(2).find(|w| w[0] == w[1]) {
            return Err(ValidationError::Duplicate {
                field: "supported_denominations".to_string(),
                value: pair[0].to_string(),
            });
        }

        Ok(Denominations(values))
    }

    /// Values largest first.
    #[inline]
    pub fn descending(&self) -> &[i64] {
        &self.0
    }

    /// Returns true if `amount` is exactly one of the accepted values.
    pub fn accepts(&self, amount: i64) -> bool {
        self.0.binary_search_by(|value| amount.cmp(value)).is_ok()
    }

    /// The largest accepted value.
    pub fn largest(&self) -> i64 {
        self.0[0]
    }

    /// The smallest accepted value.
    pub fn smallest(&self) -> i64 {
        self.0[self.0.len() - 1]
    }

    /// Number of accepted values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies the values out, largest first.
    pub fn to_vec(&self) -> Vec<i64> {
        self.0.clone()
    }
}

impl Default for Denominations {
    fn default() -> Self {
        let mut values = crate::DEFAULT_DENOMINATIONS.to_vec();
        values.sort_unstable_by(|a, b| b.cmp(a));
        Denominations(values)
    }
}

impl TryFrom<Vec<i64>> for Denominations {
    type Error = ValidationError;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        Denominations::new(values)
    }
}

impl From<Denominations> for Vec<i64> {
    fn from(d: Denominations) -> Self {
        d.0
    }
}

impl std::str::FromStr for Denominations {
    type Err = ValidationError;

    /// Parses a comma-separated list such as `"200,100,50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
                    field: "supported_denominations".to_string(),
                    reason: format!("'{}' is not an integer", part),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Denominations::new(values)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_descending() {
        let d = Denominations::new([1, 200, 50, 5]).unwrap();
        assert_eq!(d.descending(), &[200, 50, 5, 1]);
        assert_eq!(d.largest(), 200);
        assert_eq!(d.smallest(), 1);
        assert_eq!(d.len(), 4);
    }

    #[test]
    fn test_accepts() {
        let d = Denominations::default();
        assert!(d.accepts(200));
        assert!(d.accepts(25));
        assert!(d.accepts(1));
        assert!(!d.accepts(37));
        assert!(!d.accepts(0));
        assert!(!d.accepts(-100));
    }

    #[test]
    fn test_rejects_invalid_sets() {
        assert!(matches!(
            Denominations::new(Vec::new()),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Denominations::new([5, -1]),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            Denominations::new([5, 10, 5]),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_parse_from_str() {
        let d: Denominations = "100, 25,5".parse().unwrap();
        assert_eq!(d.descending(), &[100, 25, 5]);
        assert!("100,abc".parse::<Denominations>().is_err());
        assert!("".parse::<Denominations>().is_err());
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let d: Denominations = serde_json::from_str("[10, 50, 1]").unwrap();
        assert_eq!(d.descending(), &[50, 10, 1]);
        assert_eq!(serde_json::to_string(&d).unwrap(), "[50,10,1]");
        assert!(serde_json::from_str::<Denominations>("[10, 0]").is_err());
    }
}
