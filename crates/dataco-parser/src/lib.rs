pub mod delimited;
pub mod errors;
pub mod model;

pub use delimited::parse_delimited;
pub use errors::ParseError;
pub use model::{ParseOptions, RawTable, DEFAULT_NULL_VALUES};
