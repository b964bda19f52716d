// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents addressable memory. Every access is range-checked, so callers
/// get `None` rather than a panic when a guest program reaches too far.
pub trait MemoryMap {
    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]>;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Option<&mut [u8]>;

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Option<u16> {
        self.get_ro_slice(addr, 2)
            .map(|word| u16::from_be_bytes([word[0], word[1]]))
    }

    /// write a chunk of bytes; nothing is written unless all of it fits
    fn write(&mut self, data: &[u8], addr: u16) -> Option<()> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Some(())
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// biggest program image that fits between the load address and the top of RAM
pub const CHIP8_MAX_PROGRAM_SIZE: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the glyph table lives
pub const CHIP8_FONT_ADDR: u16 = 0x000;

/// each glyph is 8x5; one byte per row
pub const CHIP8_GLYPH_HEIGHT: u16 = 5;

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// What happened to a program image on the way into memory. Truncation is
/// advisory; the machine still runs whatever fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub truncated: usize,
}

impl LoadReport {
    pub fn is_truncated(&self) -> bool {
        self.truncated > 0
    }
}

/// Defines the CHIP-8 memory map as the interpreter sees it:
///   0x0000-0x004f  glyph table for hex digits
///   0x0050-0x01ff  unused (interpreter area on the real thing)
///   0x0200-0x0fff  program
pub struct Chip8Memory {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8Memory {
    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]> {
        let a = addr as usize;
        self.bytes.get(a..a.checked_add(len)?)
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Option<&mut [u8]> {
        let a = addr as usize;
        self.bytes.get_mut(a..a.checked_add(len)?)
    }
}

impl Chip8Memory {
    /// zeroed RAM with the glyph table baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8Memory { bytes }
    }

    /// load a CHIP-8 program at 0x200, silently dropping whatever doesn't fit
    pub fn load_program(&mut self, image: &[u8]) -> LoadReport {
        let loaded = image.len().min(CHIP8_MAX_PROGRAM_SIZE);
        let start = CHIP8_PROGRAM_ADDR as usize;
        self.bytes[start..start + loaded].copy_from_slice(&image[..loaded]);
        LoadReport {
            loaded,
            truncated: image.len() - loaded,
        }
    }
}

impl Default for Chip8Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8Memory::new();
        // NB. memory is zeroed from 0x200 because before that we bake in the font
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
        assert_eq!(m.bytes[0x50..0x200], [0; 0x1b0]);
    }

    #[test]
    fn test_font_at_bottom_of_ram() {
        let m = Chip8Memory::new();
        assert_eq!(m.get_ro_slice(0, 80), Some(&CHIP8_FONT[..]));
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8Memory::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write(src, 0x300), Some(()));
        assert_eq!(
            dst.bytes[0x2f8..0x308],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8Memory::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300).unwrap();
        assert_eq!(m.get_word(0x304), Some(0x0405));
    }

    #[test]
    fn test_read_word_at_top_of_ram() {
        let mut m = Chip8Memory::new();
        m.write(&[0xab, 0xcd], 0xffe).unwrap();
        assert_eq!(m.get_word(0xffe), Some(0xabcd));
        assert_eq!(m.get_word(0xfff), None);
    }

    #[test]
    fn test_write_too_much_is_refused() {
        let mut dst = Chip8Memory::new();
        assert_eq!(dst.write(&[1; 8], 4089), None);
        // nothing partial
        assert_eq!(dst.bytes[4089..], [0; 7]);
    }

    #[test]
    fn test_slices_out_of_range() {
        let mut m = Chip8Memory::new();
        assert!(m.get_ro_slice(0xfff, 1).is_some());
        assert!(m.get_ro_slice(0xfff, 2).is_none());
        assert!(m.get_rw_slice(0x1000, 0).is_some());
        assert!(m.get_rw_slice(0xffff, 1).is_none());
    }

    #[test]
    fn test_program_load_ok() {
        let mut dst = Chip8Memory::new();
        let report = dst.load_program(&[0x00, 0xe0]); // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2), Some(&[0x00, 0xe0][..]));
        assert_eq!(
            report,
            LoadReport {
                loaded: 2,
                truncated: 0
            }
        );
    }

    #[test]
    fn test_program_exactly_fills_ram() {
        let mut dst = Chip8Memory::new();
        let report = dst.load_program(&[0xaa; 0xe00]);
        assert!(!report.is_truncated());
        assert_eq!(dst.bytes[0xfff], 0xaa);
    }

    #[test]
    fn test_program_one_byte_too_long() {
        let mut dst = Chip8Memory::new();
        let mut image = vec![0x11; 0xe00];
        image.push(0x22);
        let report = dst.load_program(&image);
        assert_eq!(report.loaded, 0xe00);
        assert_eq!(report.truncated, 1);
        assert!(report.is_truncated());
        assert_eq!(dst.bytes[0xfff], 0x11);
    }
}
