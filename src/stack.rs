use std::ops::Range;
use std::rc::Rc;

use image::RgbImage;
use ndarray::{
    Array2, Array3, ArrayD, ArrayView2, ArrayViewD, ArrayViewMutD, Axis, Ix2, Ix3, Slice, Zip,
};
use tracing::{debug, trace, warn};

use crate::display::DisplayMapper;
use crate::enums::{MaskMode, PixelKind, SampleType};
use crate::error::StackError;
use crate::lut::{BuiltinLuts, DEFAULT_LUT, Lut, LutProvider};
use crate::mask::MaskCache;
use crate::naming::{NameRegistry, TitleRegistry};
use crate::roi::SharedRoi;
use crate::sample::Sample;
use crate::stack_loader::{LoadedSlices, StackLoader, StackSource};

/// Display range used for everything except 16-bit data.
pub const DEFAULT_DISPLAY_RANGE: (f64, f64) = (0.0, 255.0);

/// Construction settings for an [`ImageStack`].
#[derive(Debug, Clone)]
pub struct StackOptions {
    /// Requested title, made unique by the title registry.
    pub title: Option<String>,
    /// Name of the lookup table resolved at construction.
    pub lut: String,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            title: None,
            lut: DEFAULT_LUT.to_string(),
        }
    }
}

/// Metadata derived from the first slice.
#[derive(Debug, Clone, Copy)]
struct StackInfo {
    height: usize,
    width: usize,
    pixel_kind: PixelKind,
    channels: usize,
}

impl StackInfo {
    fn describe<T: Sample>(first: &ArrayD<T>) -> Self {
        let shape = first.shape();
        let has_channels = first.ndim() == 3;
        Self {
            height: shape[0],
            width: shape[1],
            pixel_kind: if has_channels {
                PixelKind::Rgb
            } else {
                T::TYPE.pixel_kind()
            },
            channels: if has_channels { shape[2] } else { 1 },
        }
    }
}

/// An ordered stack of equally shaped slices with display and undo state.
pub struct ImageStack<T: Sample> {
    slices: Vec<ArrayD<T>>,
    is_volumetric: bool,
    info: StackInfo,
    display_range: (f64, f64),
    active: usize,
    snapshot: Option<ArrayD<T>>,
    roi: Option<SharedRoi>,
    mask: MaskCache,
    lut: Lut,
    title: String,
    view_changed: bool,
    update: bool,
}

impl<T: Sample> ImageStack<T> {
    /// Create a stack with the default lookup table
    ///
    /// # Errors
    ///
    /// Returns error if the source has no slices or inconsistent dimensions
    pub fn new(
        source: impl Into<StackSource<T>>,
        title: Option<&str>,
    ) -> Result<Self, StackError> {
        let options = StackOptions {
            title: title.map(str::to_string),
            ..Default::default()
        };
        Self::with_options(source, &options, &mut NameRegistry::new(), &BuiltinLuts)
    }

    /// Create a stack resolving its title and lookup table through the host's services
    ///
    /// # Errors
    ///
    /// Returns error if the source is malformed or the lookup table is unknown
    pub fn with_options(
        source: impl Into<StackSource<T>>,
        options: &StackOptions,
        names: &mut dyn TitleRegistry,
        luts: &dyn LutProvider,
    ) -> Result<Self, StackError> {
        let lut = luts
            .resolve(&options.lut)
            .ok_or_else(|| StackError::UnknownLut(options.lut.clone()))?;
        let loaded = StackLoader::load(source.into())?;
        let info = StackInfo::describe(&loaded.slices[0]);

        let mut stack = Self {
            slices: Vec::new(),
            is_volumetric: false,
            info,
            display_range: DEFAULT_DISPLAY_RANGE,
            active: 0,
            snapshot: None,
            roi: None,
            mask: MaskCache::new(),
            lut,
            title: names.unique_name(options.title.as_deref()),
            view_changed: false,
            update: false,
        };
        stack.install(loaded);
        Ok(stack)
    }

    /// Replace every slice and re-derive all metadata
    ///
    /// Clears the snapshot and the mask cache. On error the stack is left untouched.
    pub fn set_images(&mut self, source: impl Into<StackSource<T>>) -> Result<(), StackError> {
        let loaded = StackLoader::load(source.into())?;
        self.install(loaded);
        Ok(())
    }

    fn install(&mut self, loaded: LoadedSlices<T>) {
        let LoadedSlices {
            slices,
            is_volumetric,
        } = loaded;

        self.info = StackInfo::describe(&slices[0]);
        self.display_range = match T::TYPE {
            SampleType::I16 | SampleType::U16 => {
                DisplayMapper::min_max(slices[0].view()).unwrap_or(DEFAULT_DISPLAY_RANGE)
            }
            _ => DEFAULT_DISPLAY_RANGE,
        };
        self.slices = slices;
        self.is_volumetric = is_volumetric;
        self.active = self.active.min(self.slices.len() - 1);
        self.snapshot = None;
        self.mask.clear();
        self.view_changed = true;

        debug!(
            height = self.info.height,
            width = self.info.width,
            slices = self.slices.len(),
            kind = ?self.info.pixel_kind,
            range = ?self.display_range,
            "image stack initialized"
        );
    }

    /// Get the unique display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Re-resolve the title through `names`
    pub fn set_title(&mut self, requested: Option<&str>, names: &mut dyn TitleRegistry) {
        self.title = names.unique_name(requested);
    }

    /// Get the pixel kind derived from the first slice
    pub fn pixel_kind(&self) -> PixelKind {
        self.info.pixel_kind
    }

    /// Get the element type of the slices
    pub fn sample_type(&self) -> SampleType {
        T::TYPE
    }

    /// Get the number of slices
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Get the number of channels per pixel (1 for 2D slices)
    pub fn channel_count(&self) -> usize {
        self.info.channels
    }

    /// Get the slice dimensions (height, width)
    pub fn dim(&self) -> (usize, usize) {
        (self.info.height, self.info.width)
    }

    /// Get the slice height
    pub fn height(&self) -> usize {
        self.info.height
    }

    /// Get the slice width
    pub fn width(&self) -> usize {
        self.info.width
    }

    /// Whether the stack was built from a single volume buffer
    pub fn is_volumetric(&self) -> bool {
        self.is_volumetric
    }

    /// Get the total size of all slices in bytes
    pub fn byte_size(&self) -> usize {
        self.slices[0].len() * T::TYPE.byte_size() * self.slices.len()
    }

    /// Get the index of the active slice
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Select the active slice. Out-of-range indices are ignored.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index < self.slices.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Get the slice at `index`, or the active slice when `index` is `None`
    pub fn slice(&self, index: Option<usize>) -> Option<&ArrayD<T>> {
        self.slices.get(index.unwrap_or(self.active))
    }

    /// Get a mutable view into the stack's own pixel data
    ///
    /// Samples can be edited in place; the slice shape cannot change.
    pub fn slice_mut(&mut self, index: Option<usize>) -> Option<ArrayViewMutD<'_, T>> {
        let index = index.unwrap_or(self.active);
        self.slices.get_mut(index).map(|slice| slice.view_mut())
    }

    /// Get a reference to the active slice
    pub fn active_slice(&self) -> &ArrayD<T> {
        &self.slices[self.active]
    }

    /// Get a mutable view of the active slice
    pub fn active_slice_mut(&mut self) -> ArrayViewMutD<'_, T> {
        self.slices[self.active].view_mut()
    }

    /// Get a reference to all slices
    pub fn slices(&self) -> &[ArrayD<T>] {
        &self.slices
    }

    /// Raw bytes of a slice, if it is stored contiguously in standard order.
    pub fn slice_bytes(&self, index: usize) -> Option<&[u8]> {
        self.slices
            .get(index)?
            .as_slice()
            .map(|data| bytemuck::cast_slice(data))
    }

    /// Get the attached ROI handle
    pub fn roi(&self) -> Option<&SharedRoi> {
        self.roi.as_ref()
    }

    /// Attach or detach a ROI. A different handle invalidates the cached mask.
    pub fn set_roi(&mut self, roi: Option<SharedRoi>) {
        let same = match (&self.roi, &roi) {
            (Some(current), Some(new)) => Rc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.mask.clear();
        }
        self.roi = roi;
    }

    /// Mask of the attached ROI for `mode`, or `None` without a ROI.
    ///
    /// The mask is rebuilt only when the ROI is dirty or `mode` changed since
    /// the last call. Returns `None` while the host holds a borrow of the ROI.
    pub fn mask(&mut self, mode: MaskMode) -> Option<&Array2<bool>> {
        let shape = self.dim();
        let roi = self.roi.as_ref()?;
        let mut roi = roi.try_borrow_mut().ok()?;
        Some(self.mask.refresh(&mut *roi, mode, shape))
    }

    /// Number of times the mask was rasterized.
    pub fn mask_rebuild_count(&self) -> usize {
        self.mask.rebuild_count()
    }

    /// The ROI bounding box clipped to the image, as `(rows, cols)`.
    pub fn bounding_ranges(&self) -> Option<(Range<usize>, Range<usize>)> {
        let roi = self.roi.as_ref()?;
        let bbox = roi.try_borrow().ok()?.bounding_box();
        Some(bbox.clip(self.info.height, self.info.width))
    }

    /// Rectangular crop of the active slice
    ///
    /// Missing ranges fall back to the ROI bounding box. Explicit ranges are
    /// clipped to the image.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::MissingRoi`] if a range is missing and no ROI is attached
    pub fn sub_image(
        &self,
        rows: Option<Range<usize>>,
        cols: Option<Range<usize>>,
    ) -> Result<ArrayViewD<'_, T>, StackError> {
        let (rows, cols) = match (rows, cols) {
            (Some(rows), Some(cols)) => (rows, cols),
            (rows, cols) => {
                let (roi_rows, roi_cols) = self.bounding_ranges().ok_or(StackError::MissingRoi)?;
                (rows.unwrap_or(roi_rows), cols.unwrap_or(roi_cols))
            }
        };
        let rows = clip_range(rows, self.info.height);
        let cols = clip_range(cols, self.info.width);
        trace!(?rows, ?cols, "extracting sub image");

        let mut view = self.active_slice().view();
        view.slice_axis_inplace(Axis(0), Slice::from(rows));
        view.slice_axis_inplace(Axis(1), Slice::from(cols));
        Ok(view)
    }

    /// Get the snapshot buffer, if one was captured
    pub fn snapshot(&self) -> Option<&ArrayD<T>> {
        self.snapshot.as_ref()
    }

    /// Copy the active slice into the snapshot buffer, reusing it if present.
    pub fn capture_snapshot(&mut self) {
        let active = &self.slices[self.active];
        match self.snapshot.as_mut() {
            Some(snapshot) => snapshot.assign(active),
            None => self.snapshot = Some(active.clone()),
        }
    }

    /// Copy the snapshot back into the active slice
    ///
    /// With `outside_roi` set and a ROI attached, only pixels outside the ROI
    /// are restored and edits inside it are kept. Returns `false` when there
    /// is no snapshot.
    pub fn restore(&mut self, outside_roi: bool) -> bool {
        if self.snapshot.is_none() {
            return false;
        }
        if outside_roi && self.mask(MaskMode::Outside).is_some() {
            return self.restore_masked();
        }
        if let Some(snapshot) = self.snapshot.as_ref() {
            self.slices[self.active].assign(snapshot);
        }
        true
    }

    fn restore_masked(&mut self) -> bool {
        let (Some(snapshot), Some(mask)) = (self.snapshot.as_ref(), self.mask.mask()) else {
            return false;
        };
        let active = &mut self.slices[self.active];

        let mask = if active.ndim() == 3 {
            mask.view().insert_axis(Axis(2)).into_dyn()
        } else {
            mask.view().into_dyn()
        };
        let Some(mask) = mask.broadcast(active.raw_dim()) else {
            warn!(shape = ?active.shape(), "mask does not cover the active slice");
            return false;
        };

        Zip::from(active)
            .and(snapshot)
            .and(&mask)
            .for_each(|pixel, &saved, &outside| {
                if outside {
                    *pixel = saved;
                }
            });
        true
    }

    /// Exchange the snapshot and the active slice without copying.
    pub fn swap(&mut self) -> bool {
        match self.snapshot.as_mut() {
            Some(snapshot) => {
                std::mem::swap(snapshot, &mut self.slices[self.active]);
                true
            }
            None => false,
        }
    }

    /// Get the `(low, high)` range mapped onto `[0, 255]`
    pub fn display_range(&self) -> (f64, f64) {
        self.display_range
    }

    /// Set the range stretched onto `[0, 255]` for non-8-bit data
    ///
    /// # Errors
    ///
    /// Returns error if `low` is above `high` or either bound is NaN
    pub fn set_display_range(&mut self, low: f64, high: f64) -> Result<(), StackError> {
        if !(low <= high) {
            return Err(StackError::InvalidDisplayRange { low, high });
        }
        self.display_range = (low, high);
        self.update = true;
        Ok(())
    }

    /// Set the display range to the observed range of the active slice.
    pub fn reset_display_range(&mut self) -> Option<(f64, f64)> {
        let range = DisplayMapper::min_max(self.active_slice().view())?;
        self.display_range = range;
        self.update = true;
        Some(range)
    }

    /// Get the lookup table used for display
    pub fn lut(&self) -> &Lut {
        &self.lut
    }

    /// Replace the lookup table and request a redraw
    pub fn set_lut(&mut self, lut: Lut) {
        self.lut = lut;
        self.update = true;
    }

    /// Resolve a lookup table by name and make it current
    ///
    /// # Errors
    ///
    /// Returns [`StackError::UnknownLut`] if `luts` does not know `name`
    pub fn set_lut_by_name(
        &mut self,
        name: &str,
        luts: &dyn LutProvider,
    ) -> Result<(), StackError> {
        let lut = luts
            .resolve(name)
            .ok_or_else(|| StackError::UnknownLut(name.to_string()))?;
        self.set_lut(lut);
        Ok(())
    }

    /// Ask the host to redraw.
    pub fn request_update(&mut self) {
        self.update = true;
    }

    /// Returns and clears the pending redraw request.
    pub fn take_update(&mut self) -> bool {
        std::mem::take(&mut self.update)
    }

    /// Returns and clears the mark set when the slices were replaced.
    pub fn take_view_changed(&mut self) -> bool {
        std::mem::take(&mut self.view_changed)
    }

    /// Map the active slice to an `(h, w, 3)` display image
    ///
    /// Single-channel data goes through the lookup table, non-8-bit samples
    /// are first stretched from the display range. Three-channel 8-bit data is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::UnsupportedDisplay`] for any other layout
    pub fn to_display(&self) -> Result<Array3<u8>, StackError> {
        let active = self.active_slice();
        match (self.info.channels, T::TYPE) {
            (1, sample_type) => {
                let plane = Self::plane(active)?;
                let range = if sample_type == SampleType::U8 {
                    DEFAULT_DISPLAY_RANGE
                } else {
                    self.display_range
                };
                trace!(?sample_type, ?range, "mapping single channel slice");
                let scaled = DisplayMapper::rescale(&plane, range);
                Ok(DisplayMapper::apply_lut(&scaled.view(), &self.lut))
            }
            (3, SampleType::U8) => {
                let rgb = active.mapv(|v| v.to_f64() as u8);
                Ok(rgb.into_dimensionality::<Ix3>()?)
            }
            (channels, sample_type) => Err(StackError::UnsupportedDisplay {
                channels,
                sample_type,
            }),
        }
    }

    /// [`ImageStack::to_display`] as an [`RgbImage`].
    pub fn to_rgb_image(&self) -> Result<RgbImage, StackError> {
        let display = self.to_display()?;
        let (height, width, _) = display.dim();
        let pixel_data: Vec<u8> = display.iter().copied().collect();
        RgbImage::from_raw(width as u32, height as u32, pixel_data)
            .ok_or(StackError::InvalidImageBuffer)
    }

    fn plane(slice: &ArrayD<T>) -> Result<ArrayView2<'_, T>, StackError> {
        let view = if slice.ndim() == 3 {
            slice.index_axis(Axis(2), 0)
        } else {
            slice.view()
        };
        Ok(view.into_dimensionality::<Ix2>()?)
    }
}

fn clip_range(range: Range<usize>, len: usize) -> Range<usize> {
    let start = range.start.min(len);
    start..range.end.clamp(start, len)
}
