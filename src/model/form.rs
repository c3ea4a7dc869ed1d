use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{amount::Amount, cpf::Cpf, record::Record};

pub const INVALID_CPF_MESSAGE: &str = "CPF inválido.";
pub const NON_NUMERIC_VALUE_MESSAGE: &str = "O valor deve ser numérico.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Cpf,
    Observation,
    Value,
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Field, String> {
        match s {
            "name" => Ok(Field::Name),
            "cpf" => Ok(Field::Cpf),
            "observation" => Ok(Field::Observation),
            "value" => Ok(Field::Value),
            other => Err(format!("Unknown form field '{}'", other)),
        }
    }
}

/// Raw text of the four inputs, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub value: String,
}

impl FormFields {
    pub fn set(&mut self, field: Field, text: String) {
        match field {
            Field::Name => self.name = text,
            Field::Cpf => self.cpf = text,
            Field::Observation => self.observation = text,
            Field::Value => self.value = text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_error(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message).collect();
        write!(f, "{}", messages.join(" "))
    }
}

impl std::error::Error for ValidationError {}

/// Checks every field and builds the record, or reports each field that failed.
pub fn build_record(fields: &FormFields, now: DateTime<Utc>) -> Result<Record, ValidationError> {
    let mut errors = Vec::new();

    let cpf = Cpf::parse(&fields.cpf);
    if cpf.is_none() {
        errors.push(FieldError {
            field: Field::Cpf,
            message: INVALID_CPF_MESSAGE,
        });
    }

    let value = Amount::parse_user_input(&fields.value).ok();
    if value.is_none() {
        errors.push(FieldError {
            field: Field::Value,
            message: NON_NUMERIC_VALUE_MESSAGE,
        });
    }

    match (cpf, value) {
        (Some(cpf), Some(value)) => {
            let name = if fields.name.trim().is_empty() {
                None
            } else {
                Some(fields.name.clone())
            };

            Ok(Record::new(
                name,
                cpf,
                fields.observation.clone(),
                value,
                now,
            ))
        }
        _ => Err(ValidationError { errors }),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::DateTime;

    use super::{build_record, Field, FormFields, INVALID_CPF_MESSAGE, NON_NUMERIC_VALUE_MESSAGE};

    fn fields(name: &str, cpf: &str, observation: &str, value: &str) -> FormFields {
        FormFields {
            name: name.to_string(),
            cpf: cpf.to_string(),
            observation: observation.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn valid_fields_build_a_record() {
        let record = build_record(
            &fields("Maria", "52998224725", "troco", "150.50"),
            DateTime::UNIX_EPOCH,
        )
        .unwrap();

        assert_eq!(record.name.as_deref(), Some("Maria"));
        assert_eq!(record.cpf.as_str(), "52998224725");
        assert_eq!(record.observation, "troco");
        assert_eq!(
            record.value.as_decimal(),
            &BigDecimal::from_str("150.5").unwrap()
        );
        assert_eq!(record.timestamp, DateTime::UNIX_EPOCH);
        assert!(!record.done);
        assert_eq!(record.id, None);
    }

    #[test]
    fn blank_name_is_absent() {
        let record = build_record(
            &fields("   ", "52998224725", "", "1"),
            DateTime::UNIX_EPOCH,
        )
        .unwrap();
        assert_eq!(record.name, None);
    }

    #[test]
    fn name_kept_as_typed() {
        let record = build_record(
            &fields(" Maria  da Silva ", "52998224725", "", "1"),
            DateTime::UNIX_EPOCH,
        )
        .unwrap();
        assert_eq!(record.name.as_deref(), Some(" Maria  da Silva "));
    }

    #[test]
    fn invalid_cpf_is_the_only_error() {
        let err = build_record(
            &fields("", "12345678900", "", "10"),
            DateTime::UNIX_EPOCH,
        )
        .unwrap_err();

        assert_eq!(err.errors.len(), 1);
        assert!(err.has_error(Field::Cpf));
        assert_eq!(err.errors[0].message, INVALID_CPF_MESSAGE);
    }

    #[test]
    fn non_numeric_value_is_the_only_error() {
        let err = build_record(
            &fields("", "52998224725", "", "abc"),
            DateTime::UNIX_EPOCH,
        )
        .unwrap_err();

        assert_eq!(err.errors.len(), 1);
        assert!(err.has_error(Field::Value));
        assert_eq!(err.errors[0].message, NON_NUMERIC_VALUE_MESSAGE);
    }

    #[test]
    fn both_errors_reported() {
        let err = build_record(&fields("", "", "", "abc"), DateTime::UNIX_EPOCH).unwrap_err();

        assert_eq!(err.errors.len(), 2);
        assert!(err.has_error(Field::Cpf));
        assert!(err.has_error(Field::Value));
        assert_eq!(err.to_string(), "CPF inválido. O valor deve ser numérico.");
    }

    #[test]
    fn field_names_parse() {
        assert_eq!(Field::from_str("cpf"), Ok(Field::Cpf));
        assert_eq!(Field::from_str("value"), Ok(Field::Value));
        assert!(Field::from_str("age").is_err());
    }

    #[test]
    fn set_replaces_one_field() {
        let mut form = FormFields::default();
        form.set(Field::Observation, String::from("nota"));
        assert_eq!(form, fields("", "", "nota", ""));
    }
}
