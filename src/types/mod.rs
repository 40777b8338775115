pub mod alignment;
pub mod granularity;
pub mod histogram;
pub mod quantity;
