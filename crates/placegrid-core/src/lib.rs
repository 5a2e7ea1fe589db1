pub mod config;
pub mod error;
pub mod types;

pub use config::PlacegridConfig;
pub use error::DescriptorError;
pub use types::*;
