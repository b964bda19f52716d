//! # instruction
//!
//! Splits a 16-bit CHIP-8 word into its fields and recognises which instruction
//! it is. This is the only decoder: the interpreter uses it on fetch, and again
//! when a deferred instruction is completed (the PC hasn't moved, so the same
//! word decodes to the same fields).
use std::fmt;

/// the nibbles and bytes of an instruction word, before any meaning is assigned
///
///   FXYN
///   F...  family
///   .X..  register X
///   ..Y.  register Y
///   ...N  4-bit immediate / sub-opcode
///   ..NN  8-bit immediate
///   .NNN  12-bit address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub family: u8,
    pub x: usize,
    pub y: usize,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl Fields {
    pub fn split(word: u16) -> Self {
        Fields {
            family: (word >> 12) as u8,
            x: ((word >> 8) & 0xf) as usize,
            y: ((word >> 4) & 0xf) as usize,
            n: (word & 0xf) as u8,
            nn: (word & 0xff) as u8,
            nnn: word & 0xfff,
        }
    }
}

/// 8XYN register-to-register operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    Shr,
    SubN,
    Shl,
}

impl AluOp {
    fn from_nibble(n: u8) -> Option<Self> {
        Some(match n {
            0x0 => AluOp::Assign,
            0x1 => AluOp::Or,
            0x2 => AluOp::And,
            0x3 => AluOp::Xor,
            0x4 => AluOp::Add,
            0x5 => AluOp::Sub,
            0x6 => AluOp::Shr,
            0x7 => AluOp::SubN,
            0xe => AluOp::Shl,
            _ => return None,
        })
    }

    fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Assign => "LD",
            AluOp::Or => "OR",
            AluOp::And => "AND",
            AluOp::Xor => "XOR",
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Shr => "SHR",
            AluOp::SubN => "SUBN",
            AluOp::Shl => "SHL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm { x: usize, nn: u8 },
    /// 4XNN
    SkipNeImm { x: usize, nn: u8 },
    /// 5XY0
    SkipEqReg { x: usize, y: usize },
    /// 6XNN
    LoadImm { x: usize, nn: u8 },
    /// 7XNN
    AddImm { x: usize, nn: u8 },
    /// 8XYN
    Alu { op: AluOp, x: usize, y: usize },
    /// 9XY0
    SkipNeReg { x: usize, y: usize },
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random { x: usize, mask: u8 },
    /// DXYN
    Draw { x: usize, y: usize, rows: u8 },
    /// EX9E
    SkipKey { x: usize },
    /// EXA1
    SkipNotKey { x: usize },
    /// FX07
    LoadDelay { x: usize },
    /// FX0A
    WaitKey { x: usize },
    /// FX15
    SetDelay { x: usize },
    /// FX18
    SetSound { x: usize },
    /// FX1E
    AddIndex { x: usize },
    /// FX29
    LoadFont { x: usize },
    /// FX33
    StoreBcd { x: usize },
    /// FX55
    Dump { x: usize },
    /// FX65
    Load { x: usize },
}

impl Instruction {
    /// `None` for any word that isn't a defined instruction, including 0NNN
    pub fn decode(word: u16) -> Option<Self> {
        let Fields {
            family,
            x,
            y,
            n,
            nn,
            nnn,
        } = Fields::split(word);
        let ins = match family {
            0x0 => match word {
                0x00e0 => Instruction::ClearScreen,
                0x00ee => Instruction::Return,
                _ => return None,
            },
            0x1 => Instruction::Jump(nnn),
            0x2 => Instruction::Call(nnn),
            0x3 => Instruction::SkipEqImm { x, nn },
            0x4 => Instruction::SkipNeImm { x, nn },
            0x5 if n == 0 => Instruction::SkipEqReg { x, y },
            0x6 => Instruction::LoadImm { x, nn },
            0x7 => Instruction::AddImm { x, nn },
            0x8 => Instruction::Alu {
                op: AluOp::from_nibble(n)?,
                x,
                y,
            },
            0x9 if n == 0 => Instruction::SkipNeReg { x, y },
            0xa => Instruction::LoadIndex(nnn),
            0xb => Instruction::JumpOffset(nnn),
            0xc => Instruction::Random { x, mask: nn },
            0xd => Instruction::Draw { x, y, rows: n },
            0xe => match nn {
                0x9e => Instruction::SkipKey { x },
                0xa1 => Instruction::SkipNotKey { x },
                _ => return None,
            },
            0xf => match nn {
                0x07 => Instruction::LoadDelay { x },
                0x0a => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1e => Instruction::AddIndex { x },
                0x29 => Instruction::LoadFont { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::Dump { x },
                0x65 => Instruction::Load { x },
                _ => return None,
            },
            _ => return None,
        };
        Some(ins)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump(a) => write!(f, "JP {:#05x}", a),
            Instruction::Call(a) => write!(f, "CALL {:#05x}", a),
            Instruction::SkipEqImm { x, nn } => write!(f, "SE V{:X}, {:#04x}", x, nn),
            Instruction::SkipNeImm { x, nn } => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::LoadImm { x, nn } => write!(f, "LD V{:X}, {:#04x}", x, nn),
            Instruction::AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            Instruction::Alu { op, x, y } => write!(f, "{} V{:X}, V{:X}", op.mnemonic(), x, y),
            Instruction::SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadIndex(a) => write!(f, "LD I, {:#05x}", a),
            Instruction::JumpOffset(a) => write!(f, "JP V0, {:#05x}", a),
            Instruction::Random { x, mask } => write!(f, "RND V{:X}, {:#04x}", x, mask),
            Instruction::Draw { x, y, rows } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, rows),
            Instruction::SkipKey { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipNotKey { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LoadFont { x } => write!(f, "LD F, V{:X}", x),
            Instruction::StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::Dump { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::Load { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields() {
        let f = Fields::split(0xd12f);
        assert_eq!(f.family, 0xd);
        assert_eq!(f.x, 0x1);
        assert_eq!(f.y, 0x2);
        assert_eq!(f.n, 0xf);
        assert_eq!(f.nn, 0x2f);
        assert_eq!(f.nnn, 0x12f);
    }

    #[test]
    fn test_decode_families() {
        assert_eq!(Instruction::decode(0x00e0), Some(Instruction::ClearScreen));
        assert_eq!(Instruction::decode(0x00ee), Some(Instruction::Return));
        assert_eq!(Instruction::decode(0x1abc), Some(Instruction::Jump(0xabc)));
        assert_eq!(Instruction::decode(0x2abc), Some(Instruction::Call(0xabc)));
        assert_eq!(
            Instruction::decode(0xc30f),
            Some(Instruction::Random { x: 3, mask: 0x0f })
        );
        assert_eq!(
            Instruction::decode(0xd125),
            Some(Instruction::Draw { x: 1, y: 2, rows: 5 })
        );
        assert_eq!(
            Instruction::decode(0x8a6e),
            Some(Instruction::Alu {
                op: AluOp::Shl,
                x: 0xa,
                y: 0x6
            })
        );
        assert_eq!(
            Instruction::decode(0xf70a),
            Some(Instruction::WaitKey { x: 7 })
        );
    }

    #[test]
    fn test_decode_rejects_undefined_shapes() {
        for word in [
            0x0000, 0x0123, 0x00e1, 0x5121, 0x912f, 0x8128, 0x812f, 0xe19f, 0xf100, 0xf1ff,
        ] {
            assert_eq!(Instruction::decode(word), None, "{:#06x}", word);
        }
    }

    #[test]
    fn test_display_mnemonics() {
        let ins = Instruction::decode(0x8125).unwrap();
        assert_eq!(ins.to_string(), "SUB V1, V2");
        let ins = Instruction::decode(0xa2f0).unwrap();
        assert_eq!(ins.to_string(), "LD I, 0x2f0");
    }
}
