use std::{fmt::Display, str::FromStr, sync::OnceLock};

use bigdecimal::BigDecimal;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

fn amount_regex() -> &'static Regex {
    static AMOUNT_RE: OnceLock<Regex> = OnceLock::new();
    AMOUNT_RE.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$").unwrap()
    })
}

/// Largest number of integer digits a finite double can hold.
const MAX_INTEGER_DIGITS: i64 = 309;
/// Digits allowed after the point, enough for the smallest subnormal double.
const MAX_SCALE: i64 = 400;

/// Monetary value of a record, kept as an exact decimal.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct Amount {
    amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmountParseError {
    input: String,
}

impl Display for AmountParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not numeric", self.input)
    }
}

impl std::error::Error for AmountParseError {}

impl Amount {
    pub fn zero() -> Amount {
        Amount {
            amount: BigDecimal::from(0),
        }
    }

    /// Parses what the user typed in the value field.
    ///
    /// Surrounding whitespace is ignored and a blank value reads as zero. Only
    /// plain decimal notation with an optional exponent is numeric.
    pub fn parse_user_input(input: &str) -> Result<Amount, AmountParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Amount::zero());
        }

        let parse_error = || AmountParseError {
            input: input.to_string(),
        };

        if !amount_regex().is_match(trimmed) {
            return Err(parse_error());
        }

        // BigDecimal does not take a leading '+'
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        BigDecimal::from_str(unsigned)
            .ok()
            .and_then(Amount::bounded)
            .ok_or_else(parse_error)
    }

    /// Rejects values whose exponent would expand into an unbounded number of
    /// digits when printed. Zero is normalized since its exponent is irrelevant.
    fn bounded(amount: BigDecimal) -> Option<Amount> {
        let (digits, scale) = amount.as_bigint_and_exponent();
        let digits = digits.to_string();
        let magnitude = digits.trim_start_matches('-');

        if magnitude == "0" {
            return Some(Amount::zero());
        }

        let integer_digits = magnitude.len() as i64 - scale;
        if integer_digits > MAX_INTEGER_DIGITS || scale > MAX_SCALE {
            return None;
        }

        Some(Amount { amount })
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.amount
    }

    pub fn serialize_for_db(&self) -> String {
        self.amount.to_string()
    }

    pub fn deserialize_from_db(amount: &str) -> Result<Amount, AmountParseError> {
        BigDecimal::from_str(amount)
            .ok()
            .and_then(Amount::bounded)
            .ok_or_else(|| AmountParseError {
                input: amount.to_string(),
            })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.amount)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let number: Number =
            serde_json::from_str(&self.amount.to_string()).map_err(serde::ser::Error::custom)?;
        Number::serialize(&number, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = Number::deserialize(deserializer)?;

        BigDecimal::from_str(n.as_str())
            .ok()
            .and_then(Amount::bounded)
            .ok_or_else(|| de::Error::custom("Failed to parse"))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Serialize};

    use crate::model::amount::Amount;

    #[derive(Deserialize, Debug, Serialize)]
    struct TestStruct {
        value: Amount,
    }

    fn decimal(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn parse_user_input_test() {
        assert_eq!(
            Amount::parse_user_input("150.50").unwrap().as_decimal(),
            &decimal("150.5")
        );
        assert_eq!(
            Amount::parse_user_input("  42 ").unwrap().as_decimal(),
            &decimal("42")
        );
        assert_eq!(
            Amount::parse_user_input("-0.01").unwrap().as_decimal(),
            &decimal("-0.01")
        );
        assert_eq!(
            Amount::parse_user_input("+7").unwrap().as_decimal(),
            &decimal("7")
        );
        assert_eq!(
            Amount::parse_user_input(".5").unwrap().as_decimal(),
            &decimal("0.5")
        );
        assert_eq!(
            Amount::parse_user_input("10.").unwrap().as_decimal(),
            &decimal("10")
        );
        assert_eq!(
            Amount::parse_user_input("1e3").unwrap().as_decimal(),
            &decimal("1000")
        );
    }

    #[test]
    fn blank_input_is_zero() {
        assert_eq!(Amount::parse_user_input("").unwrap(), Amount::zero());
        assert_eq!(Amount::parse_user_input("   ").unwrap(), Amount::zero());
    }

    #[test]
    fn non_numeric_input_rejected() {
        for input in ["abc", "12,50", "1.2.3", "NaN", "Infinity", "0x10", "R$ 10", "-", "."] {
            assert!(
                Amount::parse_user_input(input).is_err(),
                "{input} should not parse"
            );
        }

        assert_eq!(
            Amount::parse_user_input("abc").unwrap_err().to_string(),
            "'abc' is not numeric"
        );
    }

    #[test]
    fn huge_exponents_rejected() {
        for input in ["1e99999999999", "-1e400", "1e-99999999999", "9e309"] {
            assert!(
                Amount::parse_user_input(input).is_err(),
                "{input} should not parse"
            );
        }
        assert!(Amount::deserialize_from_db("1e99999999999").is_err());
        assert!(serde_json::from_str::<TestStruct>(r#"{"value":1e99999999999}"#).is_err());

        assert_eq!(
            Amount::parse_user_input("1e300").unwrap().serialize_for_db().len(),
            301
        );
        assert_eq!(
            Amount::parse_user_input("0e99999999999").unwrap(),
            Amount::zero()
        );
    }

    #[test]
    fn serialize_test() {
        assert_eq!(
            r#"{"value":150.50}"#,
            serde_json::to_string(&TestStruct {
                value: Amount::parse_user_input("150.50").unwrap()
            })
            .unwrap()
        );

        assert_eq!(
            r#"{"value":-3}"#,
            serde_json::to_string(&TestStruct {
                value: Amount::parse_user_input("-3").unwrap()
            })
            .unwrap()
        );
    }

    #[test]
    fn deserialize_test() {
        assert_eq!(
            serde_json::from_str::<TestStruct>(r#"{"value":150.5}"#)
                .unwrap()
                .value
                .as_decimal(),
            &decimal("150.50")
        );

        assert_eq!(
            serde_json::from_str::<TestStruct>(r#"{"value":0}"#)
                .unwrap()
                .value,
            Amount::zero()
        );

        assert!(serde_json::from_str::<TestStruct>(r#"{"value":"10"}"#)
            .is_err_and(|e| e.to_string().contains("invalid type: string")));
    }

    #[test]
    fn db_round_trip_keeps_scale() {
        let amount = Amount::parse_user_input("99.90").unwrap();
        assert_eq!(amount.serialize_for_db(), "99.90");
        assert_eq!(Amount::deserialize_from_db("99.90").unwrap(), amount);
        assert!(Amount::deserialize_from_db("x").is_err());
    }
}
