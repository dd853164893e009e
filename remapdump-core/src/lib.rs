pub mod dump;
pub mod error;
pub mod header;
pub mod image;
pub mod path_record;
pub mod remap;

pub use error::*;
pub use header::Header;
pub use image::*;
pub use path_record::*;
pub use remap::*;
