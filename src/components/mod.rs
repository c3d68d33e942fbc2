pub mod dump;
pub mod listings;
pub mod token_list;
pub mod tokens;
