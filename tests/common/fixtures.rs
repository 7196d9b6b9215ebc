#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use image_stack::{BoundingBox, RectRoi, Roi, SharedRoi};
use ndarray::{Array2, ArrayViewMut2};

/// Ramp image where every pixel holds `base + y * width + x`.
pub fn ramp_u8(height: usize, width: usize, base: u8) -> Array2<u8> {
    assert!(height * width <= 256 - base as usize, "ramp must fit in u8");
    Array2::from_shape_fn((height, width), |(y, x)| base + (y * width + x) as u8)
}

/// Rectangle ROI that counts how often it is rasterized.
pub struct CountingRoi {
    rect: RectRoi,
    fills: Cell<usize>,
    sketches: Cell<usize>,
}

impl CountingRoi {
    pub fn new(left: isize, top: isize, right: isize, bottom: isize) -> Self {
        Self {
            rect: RectRoi::new(BoundingBox::new(left, top, right, bottom)),
            fills: Cell::new(0),
            sketches: Cell::new(0),
        }
    }

    pub fn fills(&self) -> usize {
        self.fills.get()
    }

    pub fn sketches(&self) -> usize {
        self.sketches.get()
    }

    pub fn mark_dirty(&mut self) {
        self.rect.mark_dirty();
    }
}

impl Roi for CountingRoi {
    fn is_dirty(&self) -> bool {
        self.rect.is_dirty()
    }

    fn clear_dirty(&mut self) {
        self.rect.clear_dirty();
    }

    fn bounding_box(&self) -> BoundingBox {
        self.rect.bounding_box()
    }

    fn fill(&self, mask: ArrayViewMut2<'_, bool>, value: bool) {
        self.fills.set(self.fills.get() + 1);
        self.rect.fill(mask, value);
    }

    fn sketch(&self, mask: ArrayViewMut2<'_, bool>, width: usize, value: bool) {
        self.sketches.set(self.sketches.get() + 1);
        self.rect.sketch(mask, width, value);
    }
}

pub fn counting_roi(
    left: isize,
    top: isize,
    right: isize,
    bottom: isize,
) -> (Rc<RefCell<CountingRoi>>, SharedRoi) {
    let roi = Rc::new(RefCell::new(CountingRoi::new(left, top, right, bottom)));
    let shared: SharedRoi = roi.clone();
    (roi, shared)
}
