//! Termcanvas
//!
//! An embeddable terminal display engine: the character-grid buffer,
//! dirty tracking, incremental-redraw compositor, and input-event pipeline
//! of a terminal emulator, independent of any concrete graphics toolkit.
//!
//! The engine decides *what changed* and *what to draw*. The embedding
//! host supplies the collaborators it cannot: font metrics as a
//! [`CellMetrics`] ratio, concrete values for symbolic colors as a
//! [`Palette`], and glyph rasterization through the [`GlyphPainter`]
//! capability. Device events arrive already decoded into the [`Input`]
//! model through the [`InputPipeline`].
//!
//! This crate has NO GUI dependencies and can be driven headlessly for
//! testing.

pub mod blink;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod compositor;
pub mod dirty;
pub mod error;
pub mod geometry;
pub mod input;
pub mod pipeline;
pub mod surface;

pub use blink::BlinkClock;
pub use buffer::Buffer;
pub use cell::{Cell, Modifiers};
pub use color::{Color, ColorRole, Palette, Rgb};
pub use compositor::{CellMetrics, Compositor, CursorStyle, FrameReport, GlyphPainter};
pub use dirty::{DamageMap, DirtyTracker};
pub use error::{Error, Result};
pub use geometry::{Position, Size};
pub use input::{Input, KeyEvent, KeyKind, MouseAction, MouseButton, MouseEvent};
pub use pipeline::InputPipeline;
pub use surface::{PixelRect, PixelSize, Surface};
