//! # machine
//!
//! All the mutable state of one CHIP-8: registers, I, PC, the call stack, the
//! keypad bitmask, RAM, the framebuffer and the last values written to the
//! two timers. The machine has no clock; timer values are only remembered so a
//! host can act on them.
use crate::error::Fault;
use crate::framebuffer::Framebuffer;
use crate::memory::{Chip8Memory, LoadReport, CHIP8_PROGRAM_ADDR};

pub const CHIP8_REGISTER_COUNT: usize = 16;

/// VF doubles as carry/borrow/collision output
pub const FLAG: usize = 0xf;

pub const CHIP8_STACK_DEPTH: usize = 16;

pub const CHIP8_KEY_COUNT: u8 = 16;

/// Fixed-depth return address stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    slots: [u16; CHIP8_STACK_DEPTH],
    depth: usize,
}

impl CallStack {
    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        let slot = self.slots.get_mut(self.depth).ok_or(Fault::StackOverflow)?;
        *slot = addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        self.depth = self.depth.checked_sub(1).ok_or(Fault::StackUnderflow)?;
        Ok(self.slots[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// innermost return address first
    pub fn iter(&self) -> impl Iterator<Item = &u16> {
        self.slots[..self.depth].iter().rev()
    }
}

pub struct Machine {
    pub(crate) registers: [u8; CHIP8_REGISTER_COUNT],
    pub(crate) index: u16,
    pub(crate) program_counter: u16,
    pub(crate) stack: CallStack,
    pub(crate) keys: u16,
    pub(crate) memory: Chip8Memory,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
}

impl Machine {
    /// a fresh machine running `image`; anything past the end of RAM is dropped
    pub fn new(image: &[u8]) -> Self {
        Self::load(image).0
    }

    /// as `new`, but also says whether the image had to be truncated
    pub fn load(image: &[u8]) -> (Self, LoadReport) {
        let mut m = Machine {
            registers: [0; CHIP8_REGISTER_COUNT],
            index: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            stack: CallStack::default(),
            keys: 0,
            memory: Chip8Memory::new(),
            framebuffer: Framebuffer::new(),
            delay_timer: 0,
            sound_timer: 0,
        };
        let report = m.memory.load_program(image);
        (m, report)
    }

    pub fn registers(&self) -> &[u8; CHIP8_REGISTER_COUNT] {
        &self.registers
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn memory(&self) -> &Chip8Memory {
        &self.memory
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// last value written by FX15
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    /// last value written by FX18
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// bit k set while key k is held
    pub fn key_state(&self) -> u16 {
        self.keys
    }

    pub fn set_key_state(&mut self, keys: u16) {
        self.keys = keys;
    }

    /// keys outside 0..16 are ignored
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        if key >= CHIP8_KEY_COUNT {
            return;
        }
        if pressed {
            self.keys |= 1 << key;
        } else {
            self.keys &= !(1 << key);
        }
    }

    pub fn is_key_pressed(&self, key: u8) -> bool {
        key < CHIP8_KEY_COUNT && self.keys & (1 << key) != 0
    }
}
