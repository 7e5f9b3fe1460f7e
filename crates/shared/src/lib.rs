pub mod correlate;
pub mod filter;
pub mod models;
pub mod path;
pub mod range;
pub mod tooltip;
pub mod viewport;
