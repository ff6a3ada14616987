/// Middleware module
///
/// Custom middleware for request logging and visit counting.

mod hit_counter;
mod request_logger;

pub use hit_counter::FileServerHits;
pub use request_logger::RequestLogger;
