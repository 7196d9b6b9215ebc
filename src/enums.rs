use std::fmt;

/// Pixel category of a stack, derived once from its first slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelKind {
    Rgb,
    EightBit,
    SixteenBit,
    Float,
}

/// Element type of the pixel buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    I16,
    U16,
    F32,
}

impl SampleType {
    /// Size in bytes of a single element.
    pub fn byte_size(self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::I16 | SampleType::U16 => 2,
            SampleType::F32 => 4,
        }
    }

    pub(crate) fn pixel_kind(self) -> PixelKind {
        match self {
            SampleType::U8 => PixelKind::EightBit,
            SampleType::I16 | SampleType::U16 => PixelKind::SixteenBit,
            SampleType::F32 => PixelKind::Float,
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleType::U8 => write!(f, "u8"),
            SampleType::I16 => write!(f, "i16"),
            SampleType::U16 => write!(f, "u16"),
            SampleType::F32 => write!(f, "f32"),
        }
    }
}

/// How a mask is rasterized from the attached ROI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    /// Filled ROI interior.
    #[default]
    Inside,
    /// Complement of the filled interior.
    Outside,
    /// ROI outline drawn with the given stroke width.
    Outline(usize),
}
