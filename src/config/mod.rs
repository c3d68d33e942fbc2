pub mod listings;
pub mod settings;
