pub mod lineup;
pub mod program;
pub mod time;

pub use lineup::*;
pub use program::*;
pub use time::*;
