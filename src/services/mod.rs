pub mod catalog;
pub mod config;
pub mod fetch;
pub mod import;
pub mod matcher;
pub mod phash;
pub mod sync;
pub mod text;
pub mod translate;
