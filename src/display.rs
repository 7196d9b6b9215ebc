use ndarray::{Array2, Array3, ArrayView2, ArrayViewD, Axis, Zip};
use rayon::prelude::*;

use crate::lut::Lut;
use crate::sample::Sample;

pub(crate) struct DisplayMapper;

impl DisplayMapper {
    /// Maps every 8-bit sample through `lut`, producing an `(h, w, 3)` image.
    pub(crate) fn apply_lut(plane: &ArrayView2<'_, u8>, lut: &Lut) -> Array3<u8> {
        let (height, width) = plane.dim();
        let mut out = Array3::<u8>::zeros((height, width, 3));

        Zip::from(out.lanes_mut(Axis(2)))
            .and(plane)
            .par_for_each(|mut pixel, &value| {
                let [r, g, b] = lut.lookup(value);
                pixel[0] = r;
                pixel[1] = g;
                pixel[2] = b;
            });
        out
    }

    /// Linearly stretches `[low, high]` onto `[0, 255]`, clipping outside values.
    pub(crate) fn rescale<T: Sample>(plane: &ArrayView2<'_, T>, range: (f64, f64)) -> Array2<u8> {
        let (low, high) = range;
        let k = 255.0 / (high - low).max(1.0);

        Zip::from(plane).par_map_collect(|&value| Self::stretch(value.to_f64(), low, high, k))
    }

    #[inline]
    fn stretch(value: f64, low: f64, high: f64, k: f64) -> u8 {
        // `as u8` truncates toward zero and saturates, NaN becomes 0
        ((value.clamp(low, high) - low) * k) as u8
    }

    /// Smallest and largest sample, or `None` for an empty buffer.
    pub(crate) fn min_max<T: Sample>(data: ArrayViewD<'_, T>) -> Option<(f64, f64)> {
        let (low, high) = data
            .into_par_iter()
            .map(|&v| v.to_f64())
            .fold(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |(low, high), v| (low.min(v), high.max(v)),
            )
            .reduce(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            );
        (low <= high).then_some((low, high))
    }
}
