//! Region-of-interest collaborator.
//!
//! The stack never owns ROI geometry. It reads the bounding box and the dirty
//! flag of whatever [`Roi`] is attached, asks it to rasterize into the mask
//! buffer, and clears the flag once the mask is rebuilt. Hosts keep their own
//! handle to the ROI through [`SharedRoi`] and mark it dirty when it moves.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use ndarray::{ArrayViewMut2, s};

/// ROI handle shared between the host and the stack.
pub type SharedRoi = Rc<RefCell<dyn Roi>>;

pub trait Roi {
    /// Whether the geometry changed since the stack last consumed it.
    fn is_dirty(&self) -> bool;

    fn clear_dirty(&mut self);

    fn bounding_box(&self) -> BoundingBox;

    /// Sets every pixel covered by the ROI interior to `value`.
    fn fill(&self, mask: ArrayViewMut2<'_, bool>, value: bool);

    /// Sets every pixel on the ROI outline, `width` pixels wide, to `value`.
    fn sketch(&self, mask: ArrayViewMut2<'_, bool>, width: usize, value: bool);
}

/// Axis-aligned box in pixel coordinates, right and bottom exclusive.
///
/// Edges may lie outside the image; [`BoundingBox::clip`] brings them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: isize,
    pub top: isize,
    pub right: isize,
    pub bottom: isize,
}

impl BoundingBox {
    pub fn new(left: isize, top: isize, right: isize, bottom: isize) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Clips the box to an image of `height` x `width` and returns the
    /// half-open `(rows, cols)` ranges it covers.
    pub fn clip(&self, height: usize, width: usize) -> (Range<usize>, Range<usize>) {
        let clamp = |value: isize, max: usize| value.clamp(0, max as isize) as usize;

        let left = clamp(self.left, width);
        let right = clamp(self.right, width).max(left);
        let top = clamp(self.top, height);
        let bottom = clamp(self.bottom, height).max(top);

        (top..bottom, left..right)
    }
}

/// Rectangular ROI, the simplest collaborator a host can attach.
#[derive(Debug, Clone)]
pub struct RectRoi {
    bounds: BoundingBox,
    dirty: bool,
}

impl RectRoi {
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            dirty: true,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Moves the rectangle and marks it dirty.
    pub fn set_bounds(&mut self, bounds: BoundingBox) {
        self.bounds = bounds;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Roi for RectRoi {
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    fn fill(&self, mut mask: ArrayViewMut2<'_, bool>, value: bool) {
        let (height, width) = mask.dim();
        let (rows, cols) = self.bounds.clip(height, width);
        mask.slice_mut(s![rows, cols]).fill(value);
    }

    fn sketch(&self, mut mask: ArrayViewMut2<'_, bool>, width: usize, value: bool) {
        let (height, image_width) = mask.dim();
        let b = self.bounds;
        let w = width.max(1) as isize;

        // Band of `w` pixels just inside each edge.
        let bands = [
            BoundingBox::new(b.left, b.top, b.right, b.top + w),
            BoundingBox::new(b.left, b.bottom - w, b.right, b.bottom),
            BoundingBox::new(b.left, b.top, b.left + w, b.bottom),
            BoundingBox::new(b.right - w, b.top, b.right, b.bottom),
        ];
        for band in bands {
            let clipped = BoundingBox::new(
                band.left.max(b.left),
                band.top.max(b.top),
                band.right.min(b.right),
                band.bottom.min(b.bottom),
            );
            let (rows, cols) = clipped.clip(height, image_width);
            mask.slice_mut(s![rows, cols]).fill(value);
        }
    }
}
