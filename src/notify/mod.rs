use std::future::Future;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::model::{error::NotifyError, record::Record};

pub mod push_relay;

pub use push_relay::PushRelay;

pub const NEW_RECORD_TITLE: &str = "Nova Nota Enviada";

/// OS notification permission as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

/// Relay address of one device, e.g. `ExponentPushToken[xxxx]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushToken(String);

impl PushToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Accepts a device token only when the device granted notification permission.
pub fn register(permission: Permission, token: &str) -> Result<PushToken, NotifyError> {
    if permission != Permission::Granted {
        warn!("notification permission denied, no push token registered");
        return Err(NotifyError::PermissionDenied);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(NotifyError::InvalidToken);
    }

    info!("registered push token {}", token);
    Ok(PushToken(token.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
}

impl PushMessage {
    pub fn new_record(record: &Record) -> PushMessage {
        let who = match &record.name {
            Some(name) => format!("{} ({})", name, record.cpf.masked()),
            None => record.cpf.masked(),
        };

        PushMessage {
            title: String::from(NEW_RECORD_TITLE),
            body: format!("Nota de {} no valor de {}", who, record.value),
        }
    }
}

/// Delivers push notifications to a device.
pub trait Notifier: Send + Sync + 'static {
    fn send(
        &self,
        token: &PushToken,
        message: &PushMessage,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use crate::model::{amount::Amount, cpf::Cpf, error::NotifyError, record::Record};

    use super::{register, Permission, PushMessage, NEW_RECORD_TITLE};

    #[test]
    fn granted_permission_yields_token() {
        let token = register(Permission::Granted, " ExponentPushToken[abc] ").unwrap();
        assert_eq!(token.as_str(), "ExponentPushToken[abc]");
    }

    #[test]
    fn denied_permission_yields_no_token() {
        assert!(matches!(
            register(Permission::Denied, "ExponentPushToken[abc]"),
            Err(NotifyError::PermissionDenied)
        ));
    }

    #[test]
    fn empty_token_rejected() {
        assert!(matches!(
            register(Permission::Granted, "  "),
            Err(NotifyError::InvalidToken)
        ));
    }

    #[test]
    fn message_for_new_record() {
        let mut record = Record::new(
            Some(String::from("Maria")),
            Cpf::parse("52998224725").unwrap(),
            String::new(),
            Amount::parse_user_input("150.50").unwrap(),
            DateTime::UNIX_EPOCH,
        );

        let message = PushMessage::new_record(&record);
        assert_eq!(message.title, NEW_RECORD_TITLE);
        assert_eq!(
            message.body,
            "Nota de Maria (529.982.247-25) no valor de 150.50"
        );

        record.name = None;
        assert_eq!(
            PushMessage::new_record(&record).body,
            "Nota de 529.982.247-25 no valor de 150.50"
        );
    }
}
