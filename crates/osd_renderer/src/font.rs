//! Fixed 8x13 raster font and its texture atlas.

/// Glyph width in pixels (one bit per column of a row byte).
pub const CHARACTER_WIDTH: u32 = 8;
/// Glyph height in pixels (rows per glyph).
pub const CHARACTER_HEIGHT: u32 = 13;
/// Character code of the first glyph.
pub const CHARACTER_OFFSET: u32 = 32;
/// Number of glyphs, covering printable ASCII 32..127.
pub const CHARACTER_COUNT: u32 = 95;

/// Texel value of a lit pixel: every channel at max (opaque white).
pub const LIT_TEXEL: u32 = u32::MAX;
/// Texel value of an unlit pixel: fully transparent.
pub const UNLIT_TEXEL: u32 = 0;

/// Glyph index for a character, or `None` if it has no glyph.
pub fn glyph_index(c: char) -> Option<u32> {
    let code = c as u32;
    if (CHARACTER_OFFSET..CHARACTER_OFFSET + CHARACTER_COUNT).contains(&code) {
        Some(code - CHARACTER_OFFSET)
    } else {
        None
    }
}

/// Single-row glyph atlas: glyph `i` occupies columns `[i*8, i*8+8)` at
/// full height. Row 0 is the bottom row of every glyph.
#[derive(Debug, Clone)]
pub struct Atlas {
    /// Row-major RGBA8 texels, one `u32` per pixel.
    pub pixels: Vec<u32>,
    pub width: u32,
    pub height: u32,
}

impl Atlas {
    pub fn texel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        self.texel(x, y) == LIT_TEXEL
    }

    /// Texels as raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Decode [`RASTERS`] into an atlas. Pure and deterministic; the renderer
/// runs it once and uploads the result.
pub fn build_atlas() -> Atlas {
    let width = CHARACTER_WIDTH * CHARACTER_COUNT;
    let height = CHARACTER_HEIGHT;
    let mut pixels = vec![UNLIT_TEXEL; (width * height) as usize];

    for y in 0..CHARACTER_HEIGHT {
        for c in 0..CHARACTER_COUNT {
            let bits = RASTERS[c as usize][y as usize];
            for x in 0..CHARACTER_WIDTH {
                if bits & (1 << (CHARACTER_WIDTH - x - 1)) != 0 {
                    pixels[(width * y + CHARACTER_WIDTH * c + x) as usize] = LIT_TEXEL;
                }
            }
        }
    }

    Atlas {
        pixels,
        width,
        height,
    }
}

/// 8x13 bitmap font for ASCII 32..127.
/// Each entry is 13 bytes, bottom row first; bit 7 is the leftmost column.
#[rustfmt::skip]
pub const RASTERS: [[u8; CHARACTER_HEIGHT as usize]; CHARACTER_COUNT as usize] = [
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00], // 32 ' '
    [0x00,0x00,0x18,0x18,0x00,0x00,0x18,0x18,0x18,0x18,0x18,0x18,0x18], // 33 '!'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x36,0x36,0x36,0x36], // 34 '"'
    [0x00,0x00,0x00,0x66,0x66,0xFF,0x66,0x66,0xFF,0x66,0x66,0x00,0x00], // 35 '#'
    [0x00,0x00,0x18,0x7E,0xFF,0x1B,0x1F,0x7E,0xF8,0xD8,0xFF,0x7E,0x18], // 36 '$'
    [0x00,0x00,0x0E,0x1B,0xDB,0x6E,0x30,0x18,0x0C,0x76,0xDB,0xD8,0x70], // 37 '%'
    [0x00,0x00,0x7F,0xC6,0xCF,0xD8,0x70,0x70,0xD8,0xCC,0xCC,0x6C,0x38], // 38 '&'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x18,0x1C,0x0C,0x0E], // 39 '''
    [0x00,0x00,0x0C,0x18,0x30,0x30,0x30,0x30,0x30,0x30,0x30,0x18,0x0C], // 40 '('
    [0x00,0x00,0x30,0x18,0x0C,0x0C,0x0C,0x0C,0x0C,0x0C,0x0C,0x18,0x30], // 41 ')'
    [0x00,0x00,0x00,0x00,0x99,0x5A,0x3C,0xFF,0x3C,0x5A,0x99,0x00,0x00], // 42 '*'
    [0x00,0x00,0x00,0x18,0x18,0x18,0xFF,0xFF,0x18,0x18,0x18,0x00,0x00], // 43 '+'
    [0x00,0x00,0x30,0x18,0x1C,0x1C,0x00,0x00,0x00,0x00,0x00,0x00,0x00], // 44 ','
    [0x00,0x00,0x00,0x00,0x00,0x00,0xFF,0xFF,0x00,0x00,0x00,0x00,0x00], // 45 '-'
    [0x00,0x00,0x00,0x38,0x38,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00], // 46 '.'
    [0x00,0x60,0x60,0x30,0x30,0x18,0x18,0x0C,0x0C,0x06,0x06,0x03,0x03], // 47 '/'
    [0x00,0x00,0x3C,0x66,0xC3,0xE3,0xF3,0xDB,0xCF,0xC7,0xC3,0x66,0x3C], // 48 '0'
    [0x00,0x00,0x7E,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x78,0x38,0x18], // 49 '1'
    [0x00,0x00,0xFF,0xC0,0xC0,0x60,0x30,0x18,0x0C,0x06,0x03,0xE7,0x7E], // 50 '2'
    [0x00,0x00,0x7E,0xE7,0x03,0x03,0x07,0x7E,0x07,0x03,0x03,0xE7,0x7E], // 51 '3'
    [0x00,0x00,0x0C,0x0C,0x0C,0x0C,0x0C,0xFF,0xCC,0x6C,0x3C,0x1C,0x0C], // 52 '4'
    [0x00,0x00,0x7E,0xE7,0x03,0x03,0x07,0xFE,0xC0,0xC0,0xC0,0xC0,0xFF], // 53 '5'
    [0x00,0x00,0x7E,0xE7,0xC3,0xC3,0xC7,0xFE,0xC0,0xC0,0xC0,0xE7,0x7E], // 54 '6'
    [0x00,0x00,0x30,0x30,0x30,0x30,0x18,0x0C,0x06,0x03,0x03,0x03,0xFF], // 55 '7'
    [0x00,0x00,0x7E,0xE7,0xC3,0xC3,0xE7,0x7E,0xE7,0xC3,0xC3,0xE7,0x7E], // 56 '8'
    [0x00,0x00,0x7E,0xE7,0x03,0x03,0x03,0x7F,0xE7,0xC3,0xC3,0xE7,0x7E], // 57 '9'
    [0x00,0x00,0x00,0x38,0x38,0x00,0x00,0x38,0x38,0x00,0x00,0x00,0x00], // 58 ':'
    [0x00,0x00,0x30,0x18,0x1C,0x1C,0x00,0x00,0x1C,0x1C,0x00,0x00,0x00], // 59 ';'
    [0x00,0x00,0x06,0x0C,0x18,0x30,0x60,0xC0,0x60,0x30,0x18,0x0C,0x06], // 60 '<'
    [0x00,0x00,0x00,0x00,0xFF,0xFF,0x00,0xFF,0xFF,0x00,0x00,0x00,0x00], // 61 '='
    [0x00,0x00,0x60,0x30,0x18,0x0C,0x06,0x03,0x06,0x0C,0x18,0x30,0x60], // 62 '>'
    [0x00,0x00,0x18,0x00,0x00,0x18,0x18,0x0C,0x06,0x03,0xC3,0xC3,0x7E], // 63 '?'
    [0x00,0x00,0x3F,0x60,0xCF,0xDB,0xD3,0xDD,0xC3,0x7E,0x00,0x00,0x00], // 64 '@'
    [0x00,0x00,0xC3,0xC3,0xC3,0xC3,0xFF,0xC3,0xC3,0xC3,0x66,0x3C,0x18], // 65 'A'
    [0x00,0x00,0xFE,0xC7,0xC3,0xC3,0xC7,0xFE,0xC7,0xC3,0xC3,0xC7,0xFE], // 66 'B'
    [0x00,0x00,0x7E,0xE7,0xC0,0xC0,0xC0,0xC0,0xC0,0xC0,0xC0,0xE7,0x7E], // 67 'C'
    [0x00,0x00,0xFC,0xCE,0xC7,0xC3,0xC3,0xC3,0xC3,0xC3,0xC7,0xCE,0xFC], // 68 'D'
    [0x00,0x00,0xFF,0xC0,0xC0,0xC0,0xC0,0xFC,0xC0,0xC0,0xC0,0xC0,0xFF], // 69 'E'
    [0x00,0x00,0xC0,0xC0,0xC0,0xC0,0xC0,0xC0,0xFC,0xC0,0xC0,0xC0,0xFF], // 70 'F'
    [0x00,0x00,0x7E,0xE7,0xC3,0xC3,0xCF,0xC0,0xC0,0xC0,0xC0,0xE7,0x7E], // 71 'G'
    [0x00,0x00,0xC3,0xC3,0xC3,0xC3,0xC3,0xFF,0xC3,0xC3,0xC3,0xC3,0xC3], // 72 'H'
    [0x00,0x00,0x7E,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x7E], // 73 'I'
    [0x00,0x00,0x7C,0xEE,0xC6,0x06,0x06,0x06,0x06,0x06,0x06,0x06,0x06], // 74 'J'
    [0x00,0x00,0xC3,0xC6,0xCC,0xD8,0xF0,0xE0,0xF0,0xD8,0xCC,0xC6,0xC3], // 75 'K'
    [0x00,0x00,0xFF,0xC0,0xC0,0xC0,0xC0,0xC0,0xC0,0xC0,0xC0,0xC0,0xC0], // 76 'L'
    [0x00,0x00,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3,0xDB,0xFF,0xFF,0xE7,0xC3], // 77 'M'
    [0x00,0x00,0xC7,0xC7,0xCF,0xCF,0xDF,0xDB,0xFB,0xF3,0xF3,0xE3,0xE3], // 78 'N'
    [0x00,0x00,0x7E,0xE7,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3,0xE7,0x7E], // 79 'O'
    [0x00,0x00,0xC0,0xC0,0xC0,0xC0,0xC0,0xFE,0xC7,0xC3,0xC3,0xC7,0xFE], // 80 'P'
    [0x00,0x00,0x3F,0x6E,0xDF,0xDB,0xC3,0xC3,0xC3,0xC3,0xC3,0x66,0x3C], // 81 'Q'
    [0x00,0x00,0xC3,0xC6,0xCC,0xD8,0xF0,0xFE,0xC7,0xC3,0xC3,0xC7,0xFE], // 82 'R'
    [0x00,0x00,0x7E,0xE7,0x03,0x03,0x07,0x7E,0xE0,0xC0,0xC0,0xE7,0x7E], // 83 'S'
    [0x00,0x00,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0xFF], // 84 'T'
    [0x00,0x00,0x7E,0xE7,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3], // 85 'U'
    [0x00,0x00,0x18,0x3C,0x3C,0x66,0x66,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3], // 86 'V'
    [0x00,0x00,0xC3,0xE7,0xFF,0xFF,0xDB,0xDB,0xC3,0xC3,0xC3,0xC3,0xC3], // 87 'W'
    [0x00,0x00,0xC3,0x66,0x66,0x3C,0x3C,0x18,0x3C,0x3C,0x66,0x66,0xC3], // 88 'X'
    [0x00,0x00,0x18,0x18,0x18,0x18,0x18,0x18,0x3C,0x3C,0x66,0x66,0xC3], // 89 'Y'
    [0x00,0x00,0xFF,0xC0,0xC0,0x60,0x30,0x7E,0x0C,0x06,0x03,0x03,0xFF], // 90 'Z'
    [0x00,0x00,0x3C,0x30,0x30,0x30,0x30,0x30,0x30,0x30,0x30,0x30,0x3C], // 91 '['
    [0x00,0x03,0x03,0x06,0x06,0x0C,0x0C,0x18,0x18,0x30,0x30,0x60,0x60], // 92 '\'
    [0x00,0x00,0x3C,0x0C,0x0C,0x0C,0x0C,0x0C,0x0C,0x0C,0x0C,0x0C,0x3C], // 93 ']'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0xC3,0x66,0x3C,0x18], // 94 '^'
    [0xFF,0xFF,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00], // 95 '_'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x18,0x38,0x30,0x70], // 96 '`'
    [0x00,0x00,0x7F,0xC3,0xC3,0x7F,0x03,0xC3,0x7E,0x00,0x00,0x00,0x00], // 97 'a'
    [0x00,0x00,0xFE,0xC3,0xC3,0xC3,0xC3,0xFE,0xC0,0xC0,0xC0,0xC0,0xC0], // 98 'b'
    [0x00,0x00,0x7E,0xC3,0xC0,0xC0,0xC0,0xC3,0x7E,0x00,0x00,0x00,0x00], // 99 'c'
    [0x00,0x00,0x7F,0xC3,0xC3,0xC3,0xC3,0x7F,0x03,0x03,0x03,0x03,0x03], // 100 'd'
    [0x00,0x00,0x7F,0xC0,0xC0,0xFE,0xC3,0xC3,0x7E,0x00,0x00,0x00,0x00], // 101 'e'
    [0x00,0x00,0x30,0x30,0x30,0x30,0x30,0xFC,0x30,0x30,0x30,0x33,0x1E], // 102 'f'
    [0x7E,0xC3,0x03,0x03,0x7F,0xC3,0xC3,0xC3,0x7E,0x00,0x00,0x00,0x00], // 103 'g'
    [0x00,0x00,0xC3,0xC3,0xC3,0xC3,0xC3,0xC3,0xFE,0xC0,0xC0,0xC0,0xC0], // 104 'h'
    [0x00,0x00,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x00,0x00,0x18,0x00], // 105 'i'
    [0x38,0x6C,0x0C,0x0C,0x0C,0x0C,0x0C,0x0C,0x0C,0x00,0x00,0x0C,0x00], // 106 'j'
    [0x00,0x00,0xC6,0xCC,0xF8,0xF0,0xD8,0xCC,0xC6,0xC0,0xC0,0xC0,0xC0], // 107 'k'
    [0x00,0x00,0x7E,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x78], // 108 'l'
    [0x00,0x00,0xDB,0xDB,0xDB,0xDB,0xDB,0xDB,0xFE,0x00,0x00,0x00,0x00], // 109 'm'
    [0x00,0x00,0xC6,0xC6,0xC6,0xC6,0xC6,0xC6,0xFC,0x00,0x00,0x00,0x00], // 110 'n'
    [0x00,0x00,0x7C,0xC6,0xC6,0xC6,0xC6,0xC6,0x7C,0x00,0x00,0x00,0x00], // 111 'o'
    [0xC0,0xC0,0xC0,0xFE,0xC3,0xC3,0xC3,0xC3,0xFE,0x00,0x00,0x00,0x00], // 112 'p'
    [0x03,0x03,0x03,0x7F,0xC3,0xC3,0xC3,0xC3,0x7F,0x00,0x00,0x00,0x00], // 113 'q'
    [0x00,0x00,0xC0,0xC0,0xC0,0xC0,0xC0,0xE0,0xFE,0x00,0x00,0x00,0x00], // 114 'r'
    [0x00,0x00,0xFE,0x03,0x03,0x7E,0xC0,0xC0,0x7F,0x00,0x00,0x00,0x00], // 115 's'
    [0x00,0x00,0x1C,0x36,0x30,0x30,0x30,0x30,0xFC,0x30,0x30,0x30,0x00], // 116 't'
    [0x00,0x00,0x7E,0xC6,0xC6,0xC6,0xC6,0xC6,0xC6,0x00,0x00,0x00,0x00], // 117 'u'
    [0x00,0x00,0x18,0x3C,0x3C,0x66,0x66,0xC3,0xC3,0x00,0x00,0x00,0x00], // 118 'v'
    [0x00,0x00,0xC3,0xE7,0xFF,0xDB,0xC3,0xC3,0xC3,0x00,0x00,0x00,0x00], // 119 'w'
    [0x00,0x00,0xC3,0x66,0x3C,0x18,0x3C,0x66,0xC3,0x00,0x00,0x00,0x00], // 120 'x'
    [0xC0,0x60,0x60,0x30,0x18,0x3C,0x66,0x66,0xC3,0x00,0x00,0x00,0x00], // 121 'y'
    [0x00,0x00,0xFF,0x60,0x30,0x18,0x0C,0x06,0xFF,0x00,0x00,0x00,0x00], // 122 'z'
    [0x00,0x00,0x0F,0x18,0x18,0x18,0x38,0xF0,0x38,0x18,0x18,0x18,0x0F], // 123 '{'
    [0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18,0x18], // 124 '|'
    [0x00,0x00,0xF0,0x18,0x18,0x18,0x1C,0x0F,0x1C,0x18,0x18,0x18,0xF0], // 125 '}'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x06,0x8F,0xF1,0x60,0x00,0x00,0x00], // 126 '~'
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atlas_dimensions() {
        let atlas = build_atlas();
        assert_eq!(atlas.width, 760);
        assert_eq!(atlas.height, 13);
        assert_eq!(atlas.pixels.len(), 760 * 13);
        assert_eq!(atlas.as_bytes().len(), 760 * 13 * 4);
    }

    #[test]
    fn atlas_matches_raster_bits() {
        let atlas = build_atlas();
        for (c, rows) in RASTERS.iter().enumerate() {
            for (y, &row) in rows.iter().enumerate() {
                for x in 0..CHARACTER_WIDTH {
                    let bit = row & (0x80 >> x) != 0;
                    let px = c as u32 * CHARACTER_WIDTH + x;
                    assert_eq!(atlas.is_lit(px, y as u32), bit, "glyph {c} row {y} col {x}");
                }
            }
        }
    }

    #[test]
    fn atlas_texels_are_white_or_transparent() {
        let atlas = build_atlas();
        assert!(atlas.pixels.iter().all(|&p| p == LIT_TEXEL || p == UNLIT_TEXEL));
        // Space has no lit pixels at all.
        assert!((0..CHARACTER_WIDTH).all(|x| (0..CHARACTER_HEIGHT).all(|y| !atlas.is_lit(x, y))));
    }

    #[test]
    fn pipe_glyph_fills_its_column_pair() {
        let atlas = build_atlas();
        let base = glyph_index('|').unwrap() * CHARACTER_WIDTH;
        for y in 0..CHARACTER_HEIGHT {
            assert!(atlas.is_lit(base + 3, y));
            assert!(atlas.is_lit(base + 4, y));
            assert!(!atlas.is_lit(base, y));
        }
    }

    #[test]
    fn glyph_index_covers_printable_ascii_only() {
        assert_eq!(glyph_index(' '), Some(0));
        assert_eq!(glyph_index('A'), Some(33));
        assert_eq!(glyph_index('~'), Some(94));
        assert_eq!(glyph_index('\u{7f}'), None);
        assert_eq!(glyph_index('\n'), None);
        assert_eq!(glyph_index('é'), None);
    }
}
