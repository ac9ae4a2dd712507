pub mod quote;
pub mod transaction;
