use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;

use crate::{
    config::FailurePolicy,
    model::{
        error::PersistenceError,
        form::{build_record, Field, FormFields, ValidationError},
        record::Record,
    },
    notify::{Notifier, PushMessage, PushToken},
    store::RecordStore,
};

pub const SUCCESS_MESSAGE: &str = "Ótimo, Nota Enviada!";

/// What the form screen shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    pub fields: FormFields,
    pub cpf_error: bool,
    pub value_error: bool,
    pub success_message: Option<String>,
    /// Bumped on every rejected submit; clients shake the button when it changes.
    pub shake: u64,
}

#[derive(Debug)]
pub enum SubmitError {
    Invalid(ValidationError),
    Persistence(PersistenceError),
}

/// The form screen: field state, submission and the records sent from it.
pub struct FormSession<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    policy: FailurePolicy,
    state: FormState,
    records: Vec<Record>,
    push_token: Option<PushToken>,
}

impl<S, N> FormSession<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, policy: FailurePolicy) -> Self {
        FormSession {
            store,
            notifier,
            policy,
            state: FormState::default(),
            records: Vec::new(),
            push_token: None,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Records submitted during this session, oldest first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn push_token(&self) -> Option<&PushToken> {
        self.push_token.as_ref()
    }

    pub fn set_push_token(&mut self, token: Option<PushToken>) {
        self.push_token = token;
    }

    pub fn edit(&mut self, field: Field, text: String) {
        self.state.fields.set(field, text);
        self.state.success_message = None;
    }

    pub async fn submit(&mut self) -> Result<Record, SubmitError> {
        self.state.success_message = None;

        let record = match build_record(&self.state.fields, Utc::now()) {
            Ok(record) => record,
            Err(errors) => {
                self.state.cpf_error = errors.has_error(Field::Cpf);
                self.state.value_error = errors.has_error(Field::Value);
                self.state.shake += 1;
                info!("submit rejected: {}", errors);
                return Err(SubmitError::Invalid(errors));
            }
        };
        self.state.cpf_error = false;
        self.state.value_error = false;

        let record = match self.store.insert(record.clone()).await {
            Ok(persisted) => persisted,
            Err(e) => match self.policy {
                FailurePolicy::Surface => {
                    warn!("insert failed, keeping form: {}", e);
                    return Err(SubmitError::Persistence(e));
                }
                FailurePolicy::Silent => {
                    warn!("insert failed, reporting success anyway: {}", e);
                    record
                }
            },
        };

        self.records.push(record.clone());
        self.state.fields = FormFields::default();
        self.state.success_message = Some(String::from(SUCCESS_MESSAGE));
        info!(
            "record {:?} submitted, {} this session",
            record.id,
            self.records.len()
        );

        self.notify(&record);

        Ok(record)
    }

    fn notify(&self, record: &Record) {
        let Some(token) = self.push_token.clone() else {
            return;
        };

        let notifier = self.notifier.clone();
        let message = PushMessage::new_record(record);
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&token, &message).await {
                warn!("push notification not delivered: {}", e);
            }
        });
    }
}
