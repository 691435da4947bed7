pub mod config;
pub mod events;
pub mod subscription;
pub mod venue;

pub use config::Config;
pub use subscription::*;
pub use venue::*;
