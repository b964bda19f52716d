use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::framebuffer::EdgeMode;
use crate::input::KEY_HOLD;

/// instructions per second when nothing else is asked for
pub const DEFAULT_HZ: u32 = 700;

/// Command-line arguments for the terminal host
#[derive(Debug, Parser)]
#[command(name = "chip8", version, about = "Run a CHIP-8 program in the terminal")]
pub struct Args {
    /// CHIP-8 program image to load at 0x200
    pub rom: PathBuf,

    /// wrap sprites around the screen edges instead of clipping them
    #[arg(long)]
    pub wrap: bool,

    /// instructions per second
    #[arg(long, default_value_t = DEFAULT_HZ, value_parser = clap::value_parser!(u32).range(1..))]
    pub hz: u32,

    /// don't beep
    #[arg(long)]
    pub mute: bool,

    /// seed for the random number generator, for repeatable runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// stop after this many instructions
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// how long a key press counts as held, in milliseconds; should be longer
    /// than the terminal's key repeat delay
    #[arg(long, default_value_t = KEY_HOLD.as_millis() as u64)]
    pub key_hold_ms: u64,

    /// log verbosity; logs go to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// How the host runs a machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub edge_mode: EdgeMode,
    /// sleep between instructions
    pub cycle_delay: Duration,
    pub seed: Option<u64>,
    pub mute: bool,
    pub max_cycles: Option<u64>,
    /// terminals don't report releases; a press is held this long
    pub key_hold: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            edge_mode: EdgeMode::Clip,
            cycle_delay: cycle_delay(DEFAULT_HZ),
            seed: None,
            mute: false,
            max_cycles: None,
            key_hold: KEY_HOLD,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Config {
            edge_mode: if args.wrap {
                EdgeMode::Wrap
            } else {
                EdgeMode::Clip
            },
            cycle_delay: cycle_delay(args.hz),
            seed: args.seed,
            mute: args.mute,
            max_cycles: args.max_cycles,
            key_hold: Duration::from_millis(args.key_hold_ms),
        }
    }
}

fn cycle_delay(hz: u32) -> Duration {
    Duration::from_secs(1) / hz.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["chip8", "pong.ch8"]).unwrap();
        assert_eq!(args.rom, PathBuf::from("pong.ch8"));
        assert_eq!(args.log_level, LogLevel::Warn);
        assert_eq!(Config::from(&args), Config::default());
        assert_eq!(args.key_hold_ms, 600);
    }

    #[test]
    fn test_all_options() {
        let args = Args::try_parse_from([
            "chip8",
            "--wrap",
            "--hz",
            "500",
            "--mute",
            "--seed",
            "42",
            "--max-cycles",
            "1000",
            "--log-level",
            "debug",
            "--key-hold-ms",
            "750",
            "game.ch8",
        ])
        .unwrap();
        let config = Config::from(&args);
        assert_eq!(config.edge_mode, EdgeMode::Wrap);
        assert_eq!(config.cycle_delay, Duration::from_millis(2));
        assert_eq!(config.seed, Some(42));
        assert!(config.mute);
        assert_eq!(config.max_cycles, Some(1000));
        assert_eq!(config.key_hold, Duration::from_millis(750));
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_rom_is_required() {
        assert!(Args::try_parse_from(["chip8"]).is_err());
    }

    #[test]
    fn test_zero_hz_is_rejected() {
        assert!(Args::try_parse_from(["chip8", "--hz", "0", "a.ch8"]).is_err());
    }
}
