//! Packed 32-bit ARGB colors.

/// Color packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const CYAN: Color = Color(0xFF00_FFFF);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const YELLOW: Color = Color(0xFFFF_FF30);
    pub const BLUE: Color = Color(0xFF00_00FF);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Normalized `[r, g, b, a]`, the layout shader uniforms expect.
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            f32::from(self.red()) / 255.0,
            f32::from(self.green()) / 255.0,
            f32::from(self.blue()) / 255.0,
            f32::from(self.alpha()) / 255.0,
        ]
    }

    /// Black carrying this color's alpha, used for the drop shadow.
    pub fn shadow_rgba_f32(self) -> [f32; 4] {
        [0.0, 0.0, 0.0, f32::from(self.alpha()) / 255.0]
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self(argb)
    }
}
