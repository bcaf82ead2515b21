pub mod color;
pub mod commands;
pub mod error;
pub mod surface;
pub mod types;

pub use color::{Color, ParseColorError};
pub use commands::ShapeCommand;
pub use error::{HostError, RenderError, Result, ShapeDefect};
pub use surface::{DrawingSurface, IconGenerator};
pub use types::{Point, Rect};
