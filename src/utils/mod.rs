// Gateway module for utils - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod clock;
mod errors;
mod logger;

// Public re-exports - the ONLY way to access utils functionality
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{CacheError, RemovalError, Result};
pub use logger::init_logger;
