pub mod check;
pub mod clean_tags;
pub mod coverage;
pub mod fill_placeholders;
pub mod missing_names;
