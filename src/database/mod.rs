pub mod card_repo;
pub mod models;
pub mod settings_repo;
