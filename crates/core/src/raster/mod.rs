//! Scan conversion and compositing.
//!
//! - `path`: path segments and curve flattening
//! - `fill`: anti-aliased polygon coverage (nonzero / even-odd)
//! - `stroke`: dashing and stroke expansion into polygons
//! - `clip`: intersected clip masks
//! - `canvas`: the RGB target and source-over blending
//! - `image`: nearest-neighbour image drawing

pub mod canvas;
pub mod clip;
pub mod fill;
pub mod image;
pub mod path;
pub mod stroke;

pub use canvas::Canvas;
pub use clip::ClipMask;
pub use fill::{CoverageMask, FillRule, rasterize};
pub use image::{RasterImage, draw_image};
pub use path::{FLATTEN_TOLERANCE, PathSegment, Polyline, flatten};
pub use stroke::{LineCap, LineJoin, StrokeStyle, stroke_polylines};
