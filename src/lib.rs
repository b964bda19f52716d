//! ## Design
//!
//! * a CHIP-8 core that executes exactly one instruction per `step`, with no
//!   clock, no randomness and no I/O of its own
//! * anything the core can't produce (a random byte, a key press, the delay
//!   timer) suspends the instruction; the host supplies the value and the
//!   same instruction completes
//! * errors are values: `step` returns `Result<Signal, Fault>` and a fault
//!   leaves the machine exactly as it was
//! * abstract display, input and sound so can plug alternatives; starting
//!   with TUI in-console
//! * sprite edge behaviour (clip vs wrap) is configuration, not a guess
//!
//! Model
//!
//! Core
//!  |-- machine: registers, I, PC, call stack, keypad bits, memory, framebuffer
//!  |-- instruction: the one decoder, used on fetch and on resume
//!  |-- interpreter: step + supply_random / supply_key / supply_delay
//!  `-- framebuffer: XOR sprites, collision, clip/wrap
//!
//! Host
//!  |-- config: command line -> Config
//!  |-- display, input, sound: traits with terminal and dummy implementations
//!  |-- timer: 60Hz countdowns worked out from wall-clock time
//!  `-- environment: main loop
//!       |-- poll input, latch keys, hand a key to a waiting instruction
//!       |-- step
//!       |-- redraw / supply random or delay / restart timers / beep
//!       `-- sleep(cycle delay)
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod sound;
pub mod timer;

pub use error::{Access, Fault, HostError, ProtocolError};
pub use framebuffer::{EdgeMode, Framebuffer};
pub use interpreter::{Chip8Interpreter, DisplayChange, Need, Signal, Timer};
pub use machine::Machine;
pub use memory::LoadReport;
