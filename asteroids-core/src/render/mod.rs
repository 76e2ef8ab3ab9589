//! Drawing of world snapshots: a coloured text grid for the console layout
//! and a software framebuffer, shown as half blocks, for the pixel layout.

pub mod color;
pub mod raster;
pub mod scene;
pub mod text;

pub use color::Color;
pub use raster::Framebuffer;
pub use scene::{console_frame, pixel_frame, render_frame};
pub use text::{Cell, TextFrame};
