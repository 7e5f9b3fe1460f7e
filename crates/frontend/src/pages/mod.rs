pub mod home;
pub mod tracker;
