pub mod cursor;
pub mod listing;
pub mod token;
