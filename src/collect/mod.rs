pub mod collector;
pub mod error;
pub mod query;
pub mod window;
