pub mod overlay;
pub mod pass_recorder;
pub mod render_context;

pub use overlay::*;
pub use pass_recorder::*;
pub use render_context::*;
