pub mod form;
pub mod notifications;
pub mod path_not_found;
pub mod records;
