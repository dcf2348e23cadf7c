pub mod api;
pub mod app;
pub mod config;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod migrator;
pub mod store;
pub mod telemetry;

pub use app::app;
pub use config::Config;
pub use error::Error;
pub use store::Store;

pub use sea_orm;
