pub mod cli;
pub mod controls;
pub mod core;
pub mod error;
pub mod frame;
pub mod logging;
pub mod panel;
pub mod session;
pub mod traits;

pub use error::{Error, MissingField, Result};
pub use session::Session;
