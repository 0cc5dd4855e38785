//! Calling side of the API: a cookie-carrying HTTP client whose protected
//! calls share a single in-flight session refresh.

mod coordinator;
mod http;
mod session;

pub use coordinator::*;
pub use http::*;
pub use session::*;
