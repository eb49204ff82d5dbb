pub mod config_io;

pub use config_io::{ConfigError, load, read_config};
