mod route;
mod session;

pub use route::*;
pub use session::*;
