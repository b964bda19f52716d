//! # framebuffer
//!
//! The 64x32 monochrome display as the interpreter sees it. Pixels are kept one
//! per `bool`, row-major; packing only happens on the way out to a `Display`.

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// packed size: one bit per pixel
pub const CHIP8_DISPLAY_BYTES: usize = CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT / 8;

/// What happens to sprite pixels that land past the right or bottom edge.
/// Interpreters disagree on this, so it has to be chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// pixels beyond the edge are dropped
    #[default]
    Clip,
    /// coordinates are taken modulo the display size
    Wrap,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [bool; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [false; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// `None` for coordinates off the display
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x < CHIP8_DISPLAY_WIDTH && y < CHIP8_DISPLAY_HEIGHT {
            Some(self.pixels[y * CHIP8_DISPLAY_WIDTH + x])
        } else {
            None
        }
    }

    pub fn is_blank(&self) -> bool {
        !self.pixels.iter().any(|&p| p)
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// XOR an 8-pixel-wide sprite onto the display, one byte per row, MSB
    /// leftmost. Returns true if any lit pixel was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8], mode: EdgeMode) -> bool {
        let mut collision = false;
        for (dy, row) in rows.iter().enumerate() {
            let py = y as usize + dy;
            let py = match mode {
                EdgeMode::Wrap => py % CHIP8_DISPLAY_HEIGHT,
                EdgeMode::Clip if py >= CHIP8_DISPLAY_HEIGHT => break,
                EdgeMode::Clip => py,
            };
            for dx in 0..8 {
                if row & (0x80 >> dx) == 0 {
                    continue;
                }
                let px = x as usize + dx;
                let px = match mode {
                    EdgeMode::Wrap => px % CHIP8_DISPLAY_WIDTH,
                    EdgeMode::Clip if px >= CHIP8_DISPLAY_WIDTH => break,
                    EdgeMode::Clip => px,
                };
                let pixel = &mut self.pixels[py * CHIP8_DISPLAY_WIDTH + px];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }
        collision
    }

    /// pack into one bit per pixel, row-major, MSB first; the format `Display` expects
    pub fn to_packed(&self) -> [u8; CHIP8_DISPLAY_BYTES] {
        let mut packed = [0u8; CHIP8_DISPLAY_BYTES];
        for (i, _) in self.pixels.iter().enumerate().filter(|(_, p)| **p) {
            packed[i / 8] |= 0x80 >> (i % 8);
        }
        packed
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.pixels.chunks(CHIP8_DISPLAY_WIDTH) {
            let line: String = row.iter().map(|&p| if p { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_blank() {
        let fb = Framebuffer::new();
        assert!(fb.is_blank());
        assert_eq!(fb.to_packed(), [0; 256]);
    }

    #[test]
    fn test_draw_sets_pixels_msb_first() {
        let mut fb = Framebuffer::new();
        let collision = fb.draw_sprite(0, 0, &[0b1000_0001], EdgeMode::Clip);
        assert!(!collision);
        assert_eq!(fb.get_pixel(0, 0), Some(true));
        assert_eq!(fb.get_pixel(1, 0), Some(false));
        assert_eq!(fb.get_pixel(7, 0), Some(true));
        assert_eq!(fb.lit_count(), 2);
    }

    #[test]
    fn test_draw_twice_erases_and_collides() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(10, 5, &[0xff], EdgeMode::Clip));
        assert!(fb.draw_sprite(10, 5, &[0xff], EdgeMode::Clip));
        assert!(fb.is_blank());
    }

    #[test]
    fn test_partial_overlap_collides() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0xf0], EdgeMode::Clip);
        assert!(fb.draw_sprite(3, 0, &[0xf0], EdgeMode::Clip));
        // 0..3 lit, 3 toggled off, 4..=6 lit
        assert_eq!(fb.lit_count(), 6);
        assert_eq!(fb.get_pixel(3, 0), Some(false));
    }

    #[test]
    fn test_clip_at_right_and_bottom_edge() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(60, 30, &[0xff, 0xff, 0xff, 0xff], EdgeMode::Clip);
        // 4 columns x 2 rows survive
        assert_eq!(fb.lit_count(), 8);
        assert_eq!(fb.get_pixel(0, 0), Some(false));
        assert_eq!(fb.get_pixel(63, 31), Some(true));
    }

    #[test]
    fn test_clip_offscreen_origin_draws_nothing() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(64, 40, &[0xff], EdgeMode::Clip));
        assert!(fb.is_blank());
    }

    #[test]
    fn test_wrap_at_right_and_bottom_edge() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(60, 31, &[0xff, 0xff], EdgeMode::Wrap);
        assert_eq!(fb.lit_count(), 16);
        assert_eq!(fb.get_pixel(63, 31), Some(true));
        assert_eq!(fb.get_pixel(0, 31), Some(true));
        assert_eq!(fb.get_pixel(3, 0), Some(true));
        assert_eq!(fb.get_pixel(4, 0), Some(false));
    }

    #[test]
    fn test_wrap_offscreen_origin() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(64 + 2, 32 + 1, &[0x80], EdgeMode::Wrap);
        assert_eq!(fb.get_pixel(2, 1), Some(true));
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0xff; 15], EdgeMode::Clip);
        fb.clear();
        assert!(fb.is_blank());
    }

    #[test]
    fn test_packed_layout() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(8, 1, &[0xa5], EdgeMode::Clip);
        let packed = fb.to_packed();
        // row 1 starts at byte 8; column 8 is the second byte of the row
        assert_eq!(packed[9], 0xa5);
        assert_eq!(packed.iter().filter(|&&b| b != 0).count(), 1);
    }

    #[test]
    fn test_pixel_out_of_range() {
        let fb = Framebuffer::new();
        assert_eq!(fb.get_pixel(64, 0), None);
        assert_eq!(fb.get_pixel(0, 32), None);
    }
}
