pub mod config;
pub mod error;
pub mod stores;
pub mod matching;
pub mod db;
pub mod services;
pub mod checker;
pub mod api;

pub use config::Config;
pub use error::{ AppError, Result };
