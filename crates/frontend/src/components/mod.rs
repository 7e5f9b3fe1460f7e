pub mod filter_panel;
pub mod log_panel;
pub mod map_view;
