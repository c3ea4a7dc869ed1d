pub mod amount;
pub mod cpf;
pub mod error;
pub mod form;
pub mod record;
pub mod record_action;
