use ndarray::Array2;
use tracing::trace;

use crate::enums::MaskMode;
use crate::roi::Roi;

/// Lazily allocated ROI mask together with the mode it was built with.
///
/// A rebuild happens only when the ROI reports itself dirty or the requested
/// mode differs from the cached one; otherwise the cached buffer is returned
/// as is. The buffer is allocated once and reused across rebuilds.
#[derive(Debug, Default)]
pub struct MaskCache {
    mask: Option<Array2<bool>>,
    mode: Option<MaskMode>,
    rebuilds: usize,
}

impl MaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mask for `mode`, rebuilding it from `roi` if stale.
    pub fn refresh(
        &mut self,
        roi: &mut dyn Roi,
        mode: MaskMode,
        shape: (usize, usize),
    ) -> &Array2<bool> {
        let stale = roi.is_dirty() || self.mode != Some(mode);
        let mask = self
            .mask
            .get_or_insert_with(|| Array2::from_elem(shape, false));

        if stale {
            trace!(?mode, "rebuilding ROI mask");
            mask.fill(false);
            match mode {
                MaskMode::Outline(width) => roi.sketch(mask.view_mut(), width, true),
                MaskMode::Inside | MaskMode::Outside => roi.fill(mask.view_mut(), true),
            }
            if mode == MaskMode::Outside {
                mask.mapv_inplace(|m| !m);
            }
            roi.clear_dirty();
            self.mode = Some(mode);
            self.rebuilds += 1;
        }

        mask
    }

    /// The cached mask, if one was ever built.
    pub fn mask(&self) -> Option<&Array2<bool>> {
        self.mask.as_ref()
    }

    /// Mode of the cached mask.
    pub fn mode(&self) -> Option<MaskMode> {
        self.mode
    }

    /// Number of rasterizations performed so far.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Drops the buffer and the recorded mode.
    pub fn clear(&mut self) {
        self.mask = None;
        self.mode = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::{BoundingBox, RectRoi};

    #[test]
    fn test_lazy_allocation() {
        let mut cache = MaskCache::new();
        assert!(cache.mask().is_none());

        let mut roi = RectRoi::new(BoundingBox::new(0, 0, 2, 2));
        let mask = cache.refresh(&mut roi, MaskMode::Inside, (4, 5));
        assert_eq!(mask.dim(), (4, 5));
        assert_eq!(cache.rebuild_count(), 1);
        assert!(!roi.is_dirty());
    }

    #[test]
    fn test_reuse_without_changes() {
        let mut cache = MaskCache::new();
        let mut roi = RectRoi::new(BoundingBox::new(0, 0, 2, 2));

        let first = cache.refresh(&mut roi, MaskMode::Inside, (4, 4)).as_ptr();
        let second = cache.refresh(&mut roi, MaskMode::Inside, (4, 4)).as_ptr();
        assert_eq!(first, second);
        assert_eq!(cache.rebuild_count(), 1);
    }

    #[test]
    fn test_mode_change_rebuilds() {
        let mut cache = MaskCache::new();
        let mut roi = RectRoi::new(BoundingBox::new(0, 0, 2, 2));

        cache.refresh(&mut roi, MaskMode::Inside, (4, 4));
        let outside = cache.refresh(&mut roi, MaskMode::Outside, (4, 4));
        assert!(!outside[[0, 0]]);
        assert!(outside[[3, 3]]);
        assert_eq!(cache.rebuild_count(), 2);
        assert_eq!(cache.mode(), Some(MaskMode::Outside));
    }

    #[test]
    fn test_dirty_roi_rebuilds() {
        let mut cache = MaskCache::new();
        let mut roi = RectRoi::new(BoundingBox::new(0, 0, 2, 2));
        cache.refresh(&mut roi, MaskMode::Inside, (4, 4));

        roi.set_bounds(BoundingBox::new(2, 2, 4, 4));
        let mask = cache.refresh(&mut roi, MaskMode::Inside, (4, 4));
        assert!(!mask[[0, 0]]);
        assert!(mask[[3, 3]]);
        assert_eq!(cache.rebuild_count(), 2);
    }

    #[test]
    fn test_clear_forgets_mode() {
        let mut cache = MaskCache::new();
        let mut roi = RectRoi::new(BoundingBox::new(0, 0, 2, 2));
        cache.refresh(&mut roi, MaskMode::Outline(1), (4, 4));

        cache.clear();
        assert!(cache.mask().is_none());
        assert_eq!(cache.mode(), None);
    }
}
