//! # environment
//!
//! Sets everything up and runs the main loop. The interpreter knows nothing
//! about screens, keyboards, clocks or randomness; this is where those get
//! plugged in.
//!
//!  main loop
//!   |-- poll input: quit, latch pressed keys, hand a key to a waiting FX0A
//!   |-- expire held keys; stop the tone once the sound timer runs out
//!   |-- (waiting for a key? go round again)
//!   |-- step, then act on the signal:
//!   |     drawn/cleared   -> redraw
//!   |     need random     -> supply a byte from the rng
//!   |     need key        -> wait for input
//!   |     need delay      -> supply what's left on the delay timer
//!   |     timer written   -> restart that timer; start/stop the tone
//!   |     fault           -> log it and stop
//!   `-- sleep the rest of the cycle
use std::time::Instant;

use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::display::Display;
use crate::error::HostError;
use crate::input::{Input, InputEvent, Keypad};
use crate::instruction::Instruction;
use crate::interpreter::{Chip8Interpreter, Need, Signal, Timer};
use crate::machine::Machine;
use crate::sound::Sound;
use crate::timer::CountdownTimer;

/// why the main loop stopped, when it wasn't a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    CycleLimit,
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
    rng: StdRng,
    keypad: Keypad,
    delay_timer: CountdownTimer,
    sound_timer: CountdownTimer,
    cycles: u64,
}

impl<'a> Environment<'a> {
    pub fn new(
        machine: Machine,
        config: Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let now = Instant::now();
        Environment {
            interpreter: Chip8Interpreter::new(machine).with_edge_mode(config.edge_mode),
            display,
            input,
            sound,
            config,
            rng,
            keypad: Keypad::new(),
            delay_timer: CountdownTimer::new(now),
            sound_timer: CountdownTimer::new(now),
            cycles: 0,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// instructions executed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// run until the user quits, the cycle limit is hit, or the machine faults
    pub fn main_loop(&mut self) -> Result<Exit, HostError> {
        info!(
            "running with {:?} sprites, {:?} per instruction",
            self.config.edge_mode, self.config.cycle_delay
        );
        self.redraw()?;
        loop {
            if self.config.max_cycles.map_or(false, |max| self.cycles >= max) {
                info!("stopping after {} instructions", self.cycles);
                return Ok(Exit::CycleLimit);
            }
            if self.handle_input()? {
                info!("quit after {} instructions", self.cycles);
                return Ok(Exit::Quit);
            }
            self.update_tone(Instant::now())?;

            if self.interpreter.suspended() != Some(Need::Key) {
                self.cycle()?;
            }
            spin_sleep::sleep(self.config.cycle_delay);
        }
    }

    /// true if the user asked to quit
    fn handle_input(&mut self) -> Result<bool, HostError> {
        let now = Instant::now();
        for event in self.input.poll_events()? {
            match event {
                InputEvent::Quit => return Ok(true),
                InputEvent::Key(key) => {
                    self.keypad.press(key, now);
                    if self.interpreter.suspended() == Some(Need::Key) {
                        debug!("key {:x} ends the wait", key);
                        self.interpreter.supply_key(key)?;
                    }
                }
            }
        }
        self.keypad.expire(now, self.config.key_hold);
        self.interpreter.set_key_state(self.keypad.state());
        Ok(false)
    }

    fn update_tone(&mut self, now: Instant) -> Result<(), HostError> {
        if self.sound.is_playing() && !self.sound_timer.is_running(now) {
            self.sound.stop_tone()?;
        }
        Ok(())
    }

    /// run one instruction and deal with whatever it asks for
    fn cycle(&mut self) -> Result<(), HostError> {
        if log::log_enabled!(log::Level::Trace) {
            if let Some(word) = self.interpreter.peek_word() {
                let pc = self.interpreter.machine().program_counter();
                match Instruction::decode(word) {
                    Some(ins) => trace!("{:#05x}: {:04x}  {}", pc, word, ins),
                    None => trace!("{:#05x}: {:04x}  ???", pc, word),
                }
            }
        }

        let signal = match self.interpreter.step() {
            Ok(signal) => signal,
            Err(fault) => {
                error!("{} after {} instructions", fault, self.cycles);
                return Err(fault.into());
            }
        };

        self.cycles += 1;
        let now = Instant::now();
        match signal {
            Signal::Completed => {}
            Signal::DisplayChanged(_) => self.redraw()?,
            Signal::Need(Need::Random) => {
                let byte: u8 = self.rng.gen();
                self.interpreter.supply_random(byte)?;
            }
            Signal::Need(Need::Key) => debug!("waiting for a key"),
            Signal::Need(Need::Delay) => {
                let ticks = self.delay_timer.remaining(now);
                self.interpreter.supply_delay(ticks)?;
            }
            Signal::TimerWritten(Timer::Delay) => {
                let value = self.interpreter.machine().delay_timer();
                debug!("delay timer set to {}", value);
                self.delay_timer.set(value, now);
            }
            Signal::TimerWritten(Timer::Sound) => {
                let value = self.interpreter.machine().sound_timer();
                debug!("sound timer set to {}", value);
                self.sound_timer.set(value, now);
                if value > 0 && !self.config.mute && !self.sound.is_playing() {
                    self.sound.start_tone()?;
                } else if value == 0 && self.sound.is_playing() {
                    self.sound.stop_tone()?;
                }
            }
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<(), HostError> {
        let frame = self.interpreter.framebuffer().to_packed();
        self.display.draw(&frame)?;
        Ok(())
    }
}
