pub mod logging;
pub mod rate_limit;
pub mod session;

pub use logging::*;
pub use rate_limit::*;
pub use session::*;
