use image::{GrayImage, RgbImage};
use ndarray::{Array2, Array3, Array4, ArrayD, Axis};

use crate::error::StackError;
use crate::sample::Sample;

/// Pixel buffers handed to an [`ImageStack`](crate::stack::ImageStack).
///
/// `List` holds one buffer per slice, each `(h, w)` or `(h, w, c)`. `Volume`
/// is a single buffer whose first axis indexes the slices.
#[derive(Debug, Clone)]
pub enum StackSource<T> {
    List(Vec<ArrayD<T>>),
    Volume(ArrayD<T>),
}

impl<T> From<Vec<ArrayD<T>>> for StackSource<T> {
    fn from(slices: Vec<ArrayD<T>>) -> Self {
        StackSource::List(slices)
    }
}

impl<T> From<Vec<Array2<T>>> for StackSource<T> {
    fn from(slices: Vec<Array2<T>>) -> Self {
        StackSource::List(slices.into_iter().map(|s| s.into_dyn()).collect())
    }
}

impl<T> From<Vec<Array3<T>>> for StackSource<T> {
    fn from(slices: Vec<Array3<T>>) -> Self {
        StackSource::List(slices.into_iter().map(|s| s.into_dyn()).collect())
    }
}

impl<T> From<Array3<T>> for StackSource<T> {
    fn from(volume: Array3<T>) -> Self {
        StackSource::Volume(volume.into_dyn())
    }
}

impl<T> From<Array4<T>> for StackSource<T> {
    fn from(volume: Array4<T>) -> Self {
        StackSource::Volume(volume.into_dyn())
    }
}

/// Validated slices ready to be owned by a stack.
#[derive(Debug)]
pub struct LoadedSlices<T> {
    pub slices: Vec<ArrayD<T>>,
    pub is_volumetric: bool,
}

pub struct StackLoader;

impl StackLoader {
    /// Split and validate a source
    ///
    /// # Errors
    ///
    /// Returns error if there are no slices, a slice is neither 2D nor 3D, or
    /// slice dimensions differ from the first slice
    pub fn load<T: Sample>(source: StackSource<T>) -> Result<LoadedSlices<T>, StackError> {
        let (slices, is_volumetric) = match source {
            StackSource::List(slices) => (slices, false),
            StackSource::Volume(volume) => (Self::split_volume(volume)?, true),
        };

        if slices.is_empty() {
            return Err(StackError::EmptyStack);
        }
        Self::validate_dimensions(&slices)?;

        Ok(LoadedSlices {
            slices,
            is_volumetric,
        })
    }

    /// Build grayscale slices from decoded images
    pub fn from_gray_images(images: &[GrayImage]) -> Result<StackSource<u8>, StackError> {
        let slices = images
            .iter()
            .map(|img| {
                let (width, height) = img.dimensions();
                Array2::from_shape_vec((height as usize, width as usize), img.as_raw().clone())
                    .map(|a| a.into_dyn())
                    .map_err(|_| StackError::InvalidImageBuffer)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StackSource::List(slices))
    }

    /// Build three-channel slices from decoded images
    pub fn from_rgb_images(images: &[RgbImage]) -> Result<StackSource<u8>, StackError> {
        let slices = images
            .iter()
            .map(|img| {
                let (width, height) = img.dimensions();
                Array3::from_shape_vec((height as usize, width as usize, 3), img.as_raw().clone())
                    .map(|a| a.into_dyn())
                    .map_err(|_| StackError::InvalidImageBuffer)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StackSource::List(slices))
    }

    fn split_volume<T: Sample>(volume: ArrayD<T>) -> Result<Vec<ArrayD<T>>, StackError> {
        if volume.ndim() < 3 {
            return Err(StackError::UnsupportedRank(volume.ndim().saturating_sub(1)));
        }
        Ok(volume
            .axis_iter(Axis(0))
            .map(|slice| slice.to_owned())
            .collect())
    }

    fn validate_dimensions<T>(slices: &[ArrayD<T>]) -> Result<(), StackError> {
        let first_dim = slices[0].shape();
        if !matches!(first_dim.len(), 2 | 3) {
            return Err(StackError::UnsupportedRank(first_dim.len()));
        }
        if let Some((index, slice)) = slices
            .iter()
            .enumerate()
            .find(|(_, slice)| slice.shape() != first_dim)
        {
            return Err(StackError::InconsistentDimensions {
                index,
                expected: first_dim.to_vec(),
                found: slice.shape().to_vec(),
            });
        }
        Ok(())
    }
}
