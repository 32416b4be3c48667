//! Lowering of resolved mapping plans into statement form, plus a plain
//! text renderer for previews and golden tests.
//!
//! The resolution engine decides *what* converts to what; this crate turns
//! those decisions into ordered statements an emission layer (or a human
//! reading a preview) can follow. Lowering refuses plans that still carry
//! error nodes.

mod lower;
mod render;

pub use lower::{MAPPER_TYPE, lower_method, lower_methods};
pub use render::{RenderOptions, render_method, render_methods};
