//! Core application primitives (clock, wiring, HTTP surface)

pub mod bootstrap;
pub mod clock;
pub mod http;

pub use bootstrap::*;
pub use clock::*;
pub use http::*;
