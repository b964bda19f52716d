//! # interpreter
//!
//! Runs one CHIP-8 instruction per `step`. Three instructions can't finish on
//! their own because the machine has no source of randomness, no keyboard and
//! no clock:
//!
//!  CXNN  RND VX, NN   -- needs a random byte
//!  FX0A  LD VX, K     -- needs the next key press
//!  FX07  LD VX, DT    -- needs the delay timer's current value
//!
//! For these `step` hands back `Signal::Need(..)` without touching the PC or any
//! register, and the interpreter refuses to do anything else until the host
//! calls the matching `supply_*`. Supplying re-decodes the word at the PC (it
//! hasn't moved), writes VX and moves on.
//!
//! Ready ---step--> Ready
//!   |                ^
//!   `--step--> Suspended(need) --supply_need--'
use crate::error::{Access, Fault, ProtocolError};
use crate::framebuffer::{EdgeMode, Framebuffer};
use crate::instruction::{AluOp, Instruction};
use crate::machine::{Machine, CHIP8_KEY_COUNT, CHIP8_REGISTER_COUNT, FLAG};
use crate::memory::{MemoryMap, CHIP8_FONT_ADDR, CHIP8_GLYPH_HEIGHT};

/// every instruction is two bytes
const INSTRUCTION_WIDTH: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayChange {
    Cleared,
    Drawn,
}

/// values only the host can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Need {
    Random,
    Key,
    Delay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Delay,
    Sound,
}

/// Normal outcomes of a `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// nothing the host needs to know about
    Completed,
    /// the framebuffer should be redrawn
    DisplayChanged(DisplayChange),
    /// suspended until the matching `supply_*` is called
    Need(Need),
    /// the host should (re)start its clock for this timer
    TimerWritten(Timer),
}

pub struct Chip8Interpreter {
    machine: Machine,
    edge_mode: EdgeMode,
    suspended: Option<Need>,
}

impl Chip8Interpreter {
    pub fn new(machine: Machine) -> Self {
        Chip8Interpreter {
            machine,
            edge_mode: EdgeMode::default(),
            suspended: None,
        }
    }

    pub fn with_edge_mode(mut self, edge_mode: EdgeMode) -> Self {
        self.edge_mode = edge_mode;
        self
    }

    pub fn edge_mode(&self) -> EdgeMode {
        self.edge_mode
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.machine.framebuffer()
    }

    pub fn key_state(&self) -> u16 {
        self.machine.key_state()
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.machine.set_key(key, pressed)
    }

    pub fn set_key_state(&mut self, keys: u16) {
        self.machine.set_key_state(keys)
    }

    /// what the interpreter is waiting for, if anything
    pub fn suspended(&self) -> Option<Need> {
        self.suspended
    }

    /// the raw word at the PC, if there is one
    pub fn peek_word(&self) -> Option<u16> {
        self.machine.memory.get_word(self.machine.program_counter)
    }

    fn fetch(&self) -> Result<Instruction, Fault> {
        let pc = self.machine.program_counter;
        let word = self
            .machine
            .memory
            .get_word(pc)
            .ok_or(Fault::FetchOutOfBounds { pc })?;
        Instruction::decode(word).ok_or(Fault::InvalidInstruction { pc, word })
    }

    /// execute one instruction. On `Err` nothing has changed, PC included.
    /// While suspended this just repeats the outstanding `Need`.
    pub fn step(&mut self) -> Result<Signal, Fault> {
        if let Some(need) = self.suspended {
            return Ok(Signal::Need(need));
        }
        let ins = self.fetch()?;
        let signal = self.execute(ins)?;
        if let Signal::Need(need) = signal {
            self.suspended = Some(need);
        }
        Ok(signal)
    }

    fn execute(&mut self, ins: Instruction) -> Result<Signal, Fault> {
        let edge_mode = self.edge_mode;
        let m = &mut self.machine;
        let pc = m.program_counter;
        let next = pc.wrapping_add(INSTRUCTION_WIDTH);
        let skip = |cond: bool| {
            if cond {
                next.wrapping_add(INSTRUCTION_WIDTH)
            } else {
                next
            }
        };

        let mut signal = Signal::Completed;
        m.program_counter = match ins {
            Instruction::ClearScreen => {
                m.framebuffer.clear();
                signal = Signal::DisplayChanged(DisplayChange::Cleared);
                next
            }
            Instruction::Return => m.stack.pop()?.wrapping_add(INSTRUCTION_WIDTH),
            Instruction::Jump(addr) => addr,
            Instruction::Call(addr) => {
                m.stack.push(pc)?;
                addr
            }
            Instruction::SkipEqImm { x, nn } => skip(m.registers[x] == nn),
            Instruction::SkipNeImm { x, nn } => skip(m.registers[x] != nn),
            Instruction::SkipEqReg { x, y } => skip(m.registers[x] == m.registers[y]),
            Instruction::SkipNeReg { x, y } => skip(m.registers[x] != m.registers[y]),
            Instruction::LoadImm { x, nn } => {
                m.registers[x] = nn;
                next
            }
            Instruction::AddImm { x, nn } => {
                m.registers[x] = m.registers[x].wrapping_add(nn);
                next
            }
            Instruction::Alu { op, x, y } => {
                alu(&mut m.registers, op, x, y);
                next
            }
            Instruction::LoadIndex(addr) => {
                m.index = addr;
                next
            }
            Instruction::JumpOffset(addr) => addr.wrapping_add(m.registers[0] as u16),
            Instruction::Random { .. } => return Ok(Signal::Need(Need::Random)),
            Instruction::WaitKey { .. } => return Ok(Signal::Need(Need::Key)),
            Instruction::LoadDelay { .. } => return Ok(Signal::Need(Need::Delay)),
            Instruction::Draw { x, y, rows } => {
                let sprite = m
                    .memory
                    .get_ro_slice(m.index, rows as usize)
                    .ok_or(Fault::MemoryOutOfBounds {
                        access: Access::Sprite,
                        addr: m.index,
                    })?;
                let collision =
                    m.framebuffer
                        .draw_sprite(m.registers[x], m.registers[y], sprite, edge_mode);
                m.registers[FLAG] = collision as u8;
                signal = Signal::DisplayChanged(DisplayChange::Drawn);
                next
            }
            Instruction::SkipKey { x } => skip(key_pressed(m, x)?),
            Instruction::SkipNotKey { x } => skip(!key_pressed(m, x)?),
            Instruction::SetDelay { x } => {
                m.delay_timer = m.registers[x];
                signal = Signal::TimerWritten(Timer::Delay);
                next
            }
            Instruction::SetSound { x } => {
                m.sound_timer = m.registers[x];
                signal = Signal::TimerWritten(Timer::Sound);
                next
            }
            Instruction::AddIndex { x } => {
                m.index = m.index.wrapping_add(m.registers[x] as u16);
                next
            }
            Instruction::LoadFont { x } => {
                let digit = m.registers[x];
                if digit > 0xf {
                    return Err(Fault::BadFontDigit(digit));
                }
                m.index = CHIP8_FONT_ADDR + digit as u16 * CHIP8_GLYPH_HEIGHT;
                next
            }
            Instruction::StoreBcd { x } => {
                let value = m.registers[x];
                let dst = m
                    .memory
                    .get_rw_slice(m.index, 3)
                    .ok_or(Fault::MemoryOutOfBounds {
                        access: Access::Bcd,
                        addr: m.index,
                    })?;
                dst.copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
                next
            }
            Instruction::Dump { x } => {
                let dst = m
                    .memory
                    .get_rw_slice(m.index, x + 1)
                    .ok_or(Fault::MemoryOutOfBounds {
                        access: Access::RegisterDump,
                        addr: m.index,
                    })?;
                dst.copy_from_slice(&m.registers[..=x]);
                next
            }
            Instruction::Load { x } => {
                let src = m
                    .memory
                    .get_ro_slice(m.index, x + 1)
                    .ok_or(Fault::MemoryOutOfBounds {
                        access: Access::RegisterLoad,
                        addr: m.index,
                    })?;
                m.registers[..=x].copy_from_slice(src);
                next
            }
        };
        Ok(signal)
    }

    /// complete CXNN with `byte & NN`
    pub fn supply_random(&mut self, byte: u8) -> Result<(), ProtocolError> {
        self.resume(Need::Random, |ins| match ins {
            Instruction::Random { x, mask } => Some((x, byte & mask)),
            _ => None,
        })
    }

    /// complete FX0A with a key in 0..16
    pub fn supply_key(&mut self, key: u8) -> Result<(), ProtocolError> {
        self.expect(Need::Key)?;
        if key >= CHIP8_KEY_COUNT {
            return Err(ProtocolError::KeyOutOfRange(key));
        }
        self.resume(Need::Key, |ins| match ins {
            Instruction::WaitKey { x } => Some((x, key)),
            _ => None,
        })
    }

    /// complete FX07 with the ticks left on the delay timer (zero once it has run out)
    pub fn supply_delay(&mut self, ticks: u8) -> Result<(), ProtocolError> {
        self.resume(Need::Delay, |ins| match ins {
            Instruction::LoadDelay { x } => Some((x, ticks)),
            _ => None,
        })
    }

    fn expect(&self, supplied: Need) -> Result<(), ProtocolError> {
        match self.suspended {
            Some(expected) if expected == supplied => Ok(()),
            Some(expected) => Err(ProtocolError::WrongSupply { expected, supplied }),
            None => Err(ProtocolError::NotSuspended { supplied }),
        }
    }

    fn resume(
        &mut self,
        supplied: Need,
        complete: impl FnOnce(Instruction) -> Option<(usize, u8)>,
    ) -> Result<(), ProtocolError> {
        self.expect(supplied)?;
        let pc = self.machine.program_counter;
        // 0000 never decodes, so a missing word falls through to NotDeferred
        let word = self.peek_word().unwrap_or(0);
        let (x, value) = Instruction::decode(word)
            .and_then(complete)
            .ok_or(ProtocolError::NotDeferred { pc, word })?;
        self.machine.registers[x] = value;
        self.machine.program_counter = pc.wrapping_add(INSTRUCTION_WIDTH);
        self.suspended = None;
        Ok(())
    }
}

fn key_pressed(m: &Machine, x: usize) -> Result<bool, Fault> {
    let key = m.registers[x];
    if key >= CHIP8_KEY_COUNT {
        return Err(Fault::BadKeyIndex(key));
    }
    Ok(m.is_key_pressed(key))
}

/// 8XYN. Flags are written last, so VF as the destination ends up holding the flag.
/// Shifts work on VX alone; borrow flags mean "no borrow", compared before subtracting.
fn alu(v: &mut [u8; CHIP8_REGISTER_COUNT], op: AluOp, x: usize, y: usize) {
    let (vx, vy) = (v[x], v[y]);
    match op {
        AluOp::Assign => v[x] = vy,
        AluOp::Or => v[x] = vx | vy,
        AluOp::And => v[x] = vx & vy,
        AluOp::Xor => v[x] = vx ^ vy,
        AluOp::Add => {
            let (sum, carry) = vx.overflowing_add(vy);
            v[x] = sum;
            v[FLAG] = carry as u8;
        }
        AluOp::Sub => {
            v[x] = vx.wrapping_sub(vy);
            v[FLAG] = (vx >= vy) as u8;
        }
        AluOp::Shr => {
            v[x] = vx >> 1;
            v[FLAG] = vx & 1;
        }
        AluOp::SubN => {
            v[x] = vy.wrapping_sub(vx);
            v[FLAG] = (vy >= vx) as u8;
        }
        AluOp::Shl => {
            v[x] = vx << 1;
            v[FLAG] = vx >> 7;
        }
    }
}
