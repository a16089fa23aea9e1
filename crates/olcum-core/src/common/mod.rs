pub mod clock;
pub mod config;

pub use config::AppConfig;
