//! On-screen display text overlay: bitmap font, layout and frame drawing.

pub mod device;
pub mod error;
pub mod font;
pub mod layout;
pub mod overlay;
pub mod raster_font;
pub mod vertex;
pub mod wgpu_device;

pub use device::*;
pub use error::*;
pub use font::*;
pub use layout::*;
pub use overlay::*;
pub use raster_font::*;
pub use vertex::*;
pub use wgpu_device::*;
