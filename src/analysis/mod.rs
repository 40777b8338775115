pub mod align;
pub mod binning;
pub mod colored_line;
pub mod error;
