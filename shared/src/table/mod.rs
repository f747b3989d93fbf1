pub mod error;
pub mod record;
pub mod variable_table;
