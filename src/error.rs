use std::fmt;
use std::io;

use thiserror::Error;

use crate::interpreter::Need;

/// Which instruction tried to touch memory it couldn't reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// DXYN reading sprite rows at I
    Sprite,
    /// FX33 writing three digits at I
    Bcd,
    /// FX55 writing V0..=VX at I
    RegisterDump,
    /// FX65 reading V0..=VX from I
    RegisterLoad,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::Sprite => "read sprite data from memory",
            Access::Bcd => "write a binary coded decimal",
            Access::RegisterDump => "write the contents of the V registers",
            Access::RegisterLoad => "read data into the V registers",
        })
    }
}

/// Abnormal outcomes of a single `step`. The machine is left exactly as it
/// was before the instruction, so the host can report and decide what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("tried to read an instruction out of bounds at {pc:#05x}")]
    FetchOutOfBounds { pc: u16 },

    #[error("invalid instruction {word:#06x} at {pc:#05x}")]
    InvalidInstruction { pc: u16, word: u16 },

    #[error("tried to return from a subroutine but the call stack was empty")]
    StackUnderflow,

    #[error("tried to call a subroutine but the call stack was full")]
    StackOverflow,

    #[error("tried to {access} out of bounds at {addr:#05x}")]
    MemoryOutOfBounds { access: Access, addr: u16 },

    #[error("tried to test key {0:#04x}, which is greater than 0xf")]
    BadKeyIndex(u8),

    #[error("tried to get font digit {0:#04x}, which is greater than 0xf")]
    BadFontDigit(u8),
}

/// Misuse of the deferred-completion protocol by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("supplied {supplied:?} but the interpreter isn't waiting for anything")]
    NotSuspended { supplied: Need },

    #[error("supplied {supplied:?} but the interpreter is waiting for {expected:?}")]
    WrongSupply { expected: Need, supplied: Need },

    #[error("key {0:#04x} is outside the keypad")]
    KeyOutOfRange(u8),

    #[error("instruction {word:#06x} at {pc:#05x} can't take a supplied value")]
    NotDeferred { pc: u16, word: u16 },
}

/// Everything that can stop the host's main loop
#[derive(Debug, Error)]
pub enum HostError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("machine fault: {0}")]
    Fault(#[from] Fault),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("audio error: {0}")]
    Audio(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_messages() {
        let fault = Fault::MemoryOutOfBounds {
            access: Access::RegisterDump,
            addr: 0xff8,
        };
        assert_eq!(
            fault.to_string(),
            "tried to write the contents of the V registers out of bounds at 0xff8"
        );
        let fault = Fault::MemoryOutOfBounds {
            access: Access::Sprite,
            addr: 0xfff,
        };
        assert_eq!(
            fault.to_string(),
            "tried to read sprite data from memory out of bounds at 0xfff"
        );
    }

    #[test]
    fn test_host_error_wraps_fault_message() {
        let err = HostError::from(Fault::MemoryOutOfBounds {
            access: Access::Bcd,
            addr: 0xffe,
        });
        assert_eq!(
            err.to_string(),
            "machine fault: tried to write a binary coded decimal out of bounds at 0xffe"
        );
        let err = HostError::from(Fault::BadFontDigit(0x10));
        assert_eq!(
            err.to_string(),
            "machine fault: tried to get font digit 0x10, which is greater than 0xf"
        );
    }
}
