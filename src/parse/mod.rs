pub mod line_parser;
pub mod line_serializer;
pub mod todo_parser;
pub mod todo_serializer;

pub use line_parser::{LineError, find_components, parse_components};
pub use line_serializer::serialize_components;
pub use todo_parser::{EXTRACTORS, parse_todo};
pub use todo_serializer::{OUTPUTS, serialize_todo};
