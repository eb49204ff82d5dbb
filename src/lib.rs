pub mod cli;
pub mod codec;
pub mod io;
pub mod model;
pub mod parse;
