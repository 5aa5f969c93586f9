pub mod config;
pub mod error;
pub mod item;
pub mod metric;

pub use config::Config;
pub use error::*;
pub use item::*;
pub use metric::*;
