use std::fmt::Display;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const CPF_LENGTH: usize = 11;

/// Returns `true` when `input`, stripped of every non-digit character, is a CPF
/// with valid check digits.
pub fn validate_cpf(input: &str) -> bool {
    let digits = strip_non_digits(input);
    if digits.len() != CPF_LENGTH {
        return false;
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

fn strip_non_digits(input: &str) -> Vec<u32> {
    input.chars().filter_map(|c| c.to_digit(10)).collect()
}

// Weights run from len + 1 down to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();

    match (sum * 10) % 11 {
        10 | 11 => 0,
        rest => rest,
    }
}

/// The eleven digits of a CPF that passed [`validate_cpf`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpf {
    digits: String,
}

impl Cpf {
    pub fn parse(input: &str) -> Option<Cpf> {
        if !validate_cpf(input) {
            return None;
        }

        Some(Cpf {
            digits: input.chars().filter(|c| c.is_ascii_digit()).collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// `529.982.247-25` style rendering.
    pub fn masked(&self) -> String {
        format!(
            "{}.{}.{}-{}",
            &self.digits[0..3],
            &self.digits[3..6],
            &self.digits[6..9],
            &self.digits[9..11]
        )
    }
}

impl Display for Cpf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digits)
    }
}

impl Serialize for Cpf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.digits)
    }
}

impl<'de> Deserialize<'de> for Cpf {
    fn deserialize<D>(deserializer: D) -> Result<Cpf, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Cpf::parse(&raw).ok_or_else(|| de::Error::custom("Invalid CPF"))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_cpf, Cpf};

    #[test]
    fn known_valid_cpfs() {
        assert!(validate_cpf("52998224725"));
        assert!(validate_cpf("11144477735"));
        assert!(validate_cpf("529.982.247-25"));
        assert!(validate_cpf(" 111 444 777 35 "));
    }

    #[test]
    fn wrong_check_digits() {
        assert!(!validate_cpf("12345678900"));
        assert!(!validate_cpf("52998224724"));
        assert!(!validate_cpf("52998224715"));
        assert!(!validate_cpf("11144477736"));
    }

    #[test]
    fn wrong_length() {
        assert!(!validate_cpf(""));
        assert!(!validate_cpf("abc"));
        assert!(!validate_cpf("5299822472"));
        assert!(!validate_cpf("529982247250"));
        assert!(!validate_cpf("5299822472a"));
    }

    #[test]
    fn repdigits_rejected() {
        for d in 0..10 {
            let cpf = d.to_string().repeat(11);
            assert!(!validate_cpf(&cpf), "{cpf} should be rejected");
        }
    }

    #[test]
    fn validation_is_idempotent() {
        for input in ["52998224725", "12345678900", "", "111.444.777-35"] {
            assert_eq!(validate_cpf(input), validate_cpf(input));
        }
    }

    #[test]
    fn cpf_parse_and_mask() {
        let cpf = Cpf::parse("529.982.247-25").unwrap();
        assert_eq!(cpf.as_str(), "52998224725");
        assert_eq!(cpf.masked(), "529.982.247-25");
        assert_eq!(cpf.to_string(), "52998224725");
        assert!(Cpf::parse("12345678900").is_none());
    }

    #[test]
    fn cpf_serde() {
        let cpf: Cpf = serde_json::from_str(r#""52998224725""#).unwrap();
        assert_eq!(serde_json::to_string(&cpf).unwrap(), r#""52998224725""#);

        assert!(serde_json::from_str::<Cpf>(r#""12345678900""#)
            .is_err_and(|e| e.to_string().contains("Invalid CPF")));
    }
}
