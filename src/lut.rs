/// Name of the table every stack starts with.
pub const DEFAULT_LUT: &str = "grays";

/// 256-entry table mapping an 8-bit sample to an RGB display value.
#[derive(Clone, PartialEq, Eq)]
pub struct Lut {
    table: Box<[[u8; 3]; 256]>,
}

impl Lut {
    pub fn from_fn(f: impl Fn(u8) -> [u8; 3]) -> Self {
        let mut table = Box::new([[0u8; 3]; 256]);
        for (value, entry) in table.iter_mut().enumerate() {
            *entry = f(value as u8);
        }
        Self { table }
    }

    /// Identity grayscale ramp.
    pub fn grays() -> Self {
        Self::from_fn(|v| [v, v, v])
    }

    #[inline]
    pub fn lookup(&self, value: u8) -> [u8; 3] {
        self.table[value as usize]
    }

    pub fn entries(&self) -> &[[u8; 3]; 256] {
        &self.table
    }
}

impl Default for Lut {
    fn default() -> Self {
        Self::grays()
    }
}

impl std::fmt::Debug for Lut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lut")
            .field("first", &self.table[0])
            .field("last", &self.table[255])
            .finish()
    }
}

/// Resolves lookup tables by name.
pub trait LutProvider {
    fn resolve(&self, name: &str) -> Option<Lut>;
}

/// Single-channel ramps that need no color data.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinLuts;

impl LutProvider for BuiltinLuts {
    fn resolve(&self, name: &str) -> Option<Lut> {
        let lut = match name.to_ascii_lowercase().as_str() {
            "grays" | "gray" | "grey" => Lut::grays(),
            "red" => Lut::from_fn(|v| [v, 0, 0]),
            "green" => Lut::from_fn(|v| [0, v, 0]),
            "blue" => Lut::from_fn(|v| [0, 0, v]),
            "invert" => Lut::from_fn(|v| [255 - v, 255 - v, 255 - v]),
            _ => return None,
        };
        Some(lut)
    }
}
