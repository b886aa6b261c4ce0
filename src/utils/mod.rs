pub mod error_messages;
pub mod input_validation;
