mod queries;
mod types;

pub use self::queries::*;
pub use self::types::*;
