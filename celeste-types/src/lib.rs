pub mod models;
pub mod enums;
pub mod likeable;
pub mod viewer;

pub use models::*;
pub use enums::*;
pub use likeable::*;
pub use viewer::*;
