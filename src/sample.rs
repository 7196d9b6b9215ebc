use crate::enums::SampleType;

/// Element types an [`ImageStack`](crate::stack::ImageStack) can hold.
pub trait Sample: bytemuck::Pod + PartialOrd + Send + Sync + 'static {
    const TYPE: SampleType;

    fn to_f64(self) -> f64;
}

impl Sample for u8 {
    const TYPE: SampleType = SampleType::U8;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for i16 {
    const TYPE: SampleType = SampleType::I16;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for u16 {
    const TYPE: SampleType = SampleType::U16;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f32 {
    const TYPE: SampleType = SampleType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}
