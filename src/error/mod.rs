mod kinds;
mod types;

pub use kinds::*;
pub use types::*;
