use crate::runtime::ElapsedTime;

/// Current draw color, stored as three unsigned 16-bit channels.
///
/// The shader reads the red channel back as a time value, which is why it
/// tracks elapsed milliseconds instead of an actual color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameColor {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl FrameColor {
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    /// Red is `elapsed / runtime_seconds` truncated to 16 bits; green and blue
    /// carry `runtime_seconds`.
    ///
    /// `runtime_seconds` must be non-zero; `DemoConfig::validate` guarantees it
    /// for every loop.
    pub fn from_elapsed(elapsed: ElapsedTime, runtime_seconds: u32) -> Self {
        let runtime = u64::from(runtime_seconds);
        let red = (elapsed.as_millis() / runtime) as u16;
        let constant = runtime_seconds as u16;
        Self::new(red, constant, constant)
    }

    /// Channels mapped to `[0, 1]` the way unsigned-short colors are normalised.
    pub fn normalized(self) -> [f32; 4] {
        const MAX: f32 = u16::MAX as f32;
        [
            f32::from(self.red) / MAX,
            f32::from(self.green) / MAX,
            f32::from(self.blue) / MAX,
            1.0,
        ]
    }
}
