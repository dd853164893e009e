pub mod format;
pub mod patch;
pub mod view;

pub use format::*;
pub use patch::*;
pub use view::*;
