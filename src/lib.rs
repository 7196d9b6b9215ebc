//! # Image-stack library
//!
//! This crate serves an in-memory model of a multi-slice image stack and the
//! state needed to display and edit it.

//!
//! A stack owns an ordered list of equally shaped slices, either 2D
//! `(height, width)` buffers or multi-channel `(height, width, channels)`
//! buffers, built from a list of [`ndarray`] arrays or from a single volume.
//! On top of the pixel data it keeps:
//!  - Metadata derived from the first slice (pixel kind, channels, size)
//!  - The active slice and a snapshot buffer for undo, restore and swap
//!  - A cached mask rasterized from an attached region of interest
//!  - A display range and lookup table mapping samples to 8-bit RGB
//!
//!  ROI geometry, lookup-table colors and title bookkeeping are collaborators
//!  supplied by the host through the [`Roi`], [`LutProvider`] and
//!  [`TitleRegistry`] traits. Simple implementations of each are included.
//!
//! # Examples
//!
//! ## Restoring edits outside a region of interest
//!
//! ```
//! # use image_stack::{BoundingBox, ImageStack, RectRoi};
//! # use ndarray::Array2;
//! # use std::{cell::RefCell, rc::Rc};
//! let slices = vec![Array2::<u8>::from_elem((8, 8), 10)];
//! let mut stack = ImageStack::new(slices, Some("cells")).expect("should have built the stack");
//! let roi = Rc::new(RefCell::new(RectRoi::new(BoundingBox::new(2, 2, 6, 6))));
//! stack.set_roi(Some(roi));
//!
//! stack.capture_snapshot();
//! stack.active_slice_mut().fill(200);
//! stack.restore(true);
//!
//! assert_eq!(stack.active_slice()[[0, 0]], 10);
//! assert_eq!(stack.active_slice()[[3, 3]], 200);
//! ```

mod display;
pub mod enums;
pub mod error;
pub mod lut;
pub mod mask;
pub mod naming;
pub mod roi;
pub mod sample;
pub mod stack;
pub mod stack_loader;

pub use enums::{MaskMode, PixelKind, SampleType};
pub use error::StackError;
pub use lut::{BuiltinLuts, Lut, LutProvider};
pub use naming::{NameRegistry, TitleRegistry};
pub use roi::{BoundingBox, RectRoi, Roi, SharedRoi};
pub use sample::Sample;
pub use stack::{ImageStack, StackOptions};
pub use stack_loader::{StackLoader, StackSource};
