pub mod alarm;
pub mod config;
pub mod line;
pub mod todo;

pub use alarm::*;
pub use config::*;
pub use line::*;
pub use todo::*;
