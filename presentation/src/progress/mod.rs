//! Terminal progress output

pub mod reporter;
