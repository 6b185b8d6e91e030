use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// ISO 3166-1 numeric country code, the join key between topology and attributes.
///
/// Sources disagree on representation (`"004"`, `"4"`, `4`, `"-99"`); every
/// form is normalized to the integer value on ingestion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumericId(i32);

impl NumericId {
    /// Landmass without a sovereign state (Antarctica).
    pub const ANTARCTICA: NumericId = NumericId(10);
    /// Disputed territory without an assigned code.
    pub const DISPUTED: NumericId = NumericId(-99);

    pub const fn new(n: i32) -> Self {
        NumericId(n)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub fn is_disputed(self) -> bool {
        self == Self::DISPUTED
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericIdError {
    pub input: String,
}

impl fmt::Display for NumericIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid numeric country id: {:?}", self.input)
    }
}

impl std::error::Error for NumericIdError {}

impl FromStr for NumericId {
    type Err = NumericIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(NumericId)
            .map_err(|_| NumericIdError {
                input: s.to_string(),
            })
    }
}

impl TryFrom<i64> for NumericId {
    type Error = NumericIdError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        i32::try_from(n).map(NumericId).map_err(|_| NumericIdError {
            input: n.to_string(),
        })
    }
}

impl fmt::Display for NumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 0 {
            write!(f, "{:03}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for NumericId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NumericId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericIdVisitor)
    }
}

struct NumericIdVisitor;

impl Visitor<'_> for NumericIdVisitor {
    type Value = NumericId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a numeric country id as an integer or a string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<NumericId, E> {
        NumericId::try_from(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<NumericId, E> {
        i64::try_from(v)
            .map_err(|_| E::custom(format!("numeric country id out of range: {v}")))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<NumericId, E> {
        if v.fract() != 0.0 || !v.is_finite() {
            return Err(E::custom(format!("numeric country id is not integral: {v}")));
        }
        self.visit_i64(v as i64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<NumericId, E> {
        v.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::NumericId;

    #[test]
    fn parses_padded_and_signed_strings() {
        assert_eq!("004".parse::<NumericId>().unwrap(), NumericId::new(4));
        assert_eq!("250".parse::<NumericId>().unwrap(), NumericId::new(250));
        assert_eq!("-99".parse::<NumericId>().unwrap(), NumericId::DISPUTED);
        assert!("FRA".parse::<NumericId>().is_err());
    }

    #[test]
    fn deserializes_strings_and_numbers_to_same_key() {
        let from_str: NumericId = serde_json::from_str("\"036\"").unwrap();
        let from_num: NumericId = serde_json::from_str("36").unwrap();
        assert_eq!(from_str, from_num);
        assert!(serde_json::from_str::<NumericId>("36.5").is_err());
    }

    #[test]
    fn displays_iso_padding() {
        assert_eq!(NumericId::new(4).to_string(), "004");
        assert_eq!(NumericId::new(999).to_string(), "999");
        assert_eq!(NumericId::DISPUTED.to_string(), "-99");
        assert_eq!(serde_json::to_string(&NumericId::new(10)).unwrap(), "\"010\"");
    }
}
