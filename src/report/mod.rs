//! Report renderers for scan summaries and endpoint lists

pub mod csv;
pub mod json;
pub mod text;
