use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

use crate::machine::CHIP8_KEY_COUNT;

/// COSMAC VIP hex keypad laid over the left-hand side of a qwerty keyboard
///   1 2 3 C      1 2 3 4
///   4 5 6 D  <-  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals don't report key releases, so a press counts as held for this
/// long; longer than the usual auto-repeat delay (250-500ms) so a key held down
/// stays down until the repeats arrive
pub const KEY_HOLD: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// a keypad key, 0x0-0xf
    Key(u8),
    Quit,
}

/// reads keypresses
pub trait Input {
    /// everything that happened since the last poll, oldest first; never blocks
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error>;
}

/// keyboard input from the terminal, read with crossterm in raw mode
pub struct StdinInput {
    keymap: HashMap<char, u8>,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
        })
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        let mut events = Vec::new();
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => events.push(InputEvent::Quit),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(InputEvent::Quit)
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => events.push(InputEvent::Key(*mapped_key)),
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    _ => {}
                }
            }
        }
        Ok(events)
    }
}

/// dummy Input implementation for testing: hands out one batch of events per poll
pub struct DummyInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl DummyInput {
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        DummyInput {
            batches: batches.into(),
        }
    }
}

impl Input for DummyInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}

/// Turns momentary key presses into a held-keys bitmask: each press latches
/// its bit until the hold time passes without it being pressed again.
#[derive(Debug, Default)]
pub struct Keypad {
    pressed_at: [Option<Instant>; CHIP8_KEY_COUNT as usize],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    pub fn press(&mut self, key: u8, now: Instant) {
        if let Some(slot) = self.pressed_at.get_mut(key as usize) {
            *slot = Some(now);
        }
    }

    /// drop keys that haven't been pressed for `hold`
    pub fn expire(&mut self, now: Instant, hold: Duration) {
        for slot in self.pressed_at.iter_mut() {
            if matches!(slot, Some(at) if now.saturating_duration_since(*at) >= hold) {
                *slot = None;
            }
        }
    }

    pub fn state(&self) -> u16 {
        self.pressed_at
            .iter()
            .enumerate()
            .filter(|(_, at)| at.is_some())
            .fold(0, |keys, (k, _)| keys | 1 << k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_keypad() {
        let map = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        let mut keys: Vec<u8> = map.values().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_dummy_input_batches() -> Result<(), io::Error> {
        let mut input = DummyInput::new(vec![
            vec![InputEvent::Key(1), InputEvent::Key(2)],
            vec![],
            vec![InputEvent::Quit],
        ]);
        assert_eq!(
            input.poll_events()?,
            vec![InputEvent::Key(1), InputEvent::Key(2)]
        );
        assert!(input.poll_events()?.is_empty());
        assert_eq!(input.poll_events()?, vec![InputEvent::Quit]);
        assert!(input.poll_events()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_keypad_latches_and_expires() {
        let hold = Duration::from_millis(150);
        let start = Instant::now();
        let mut pad = Keypad::new();
        pad.press(0x3, start);
        pad.press(0xf, start + Duration::from_millis(100));
        assert_eq!(pad.state(), 1 << 3 | 1 << 0xf);

        pad.expire(start + hold, hold);
        assert_eq!(pad.state(), 1 << 0xf);

        pad.expire(start + Duration::from_millis(250), hold);
        assert_eq!(pad.state(), 0);
    }

    #[test]
    fn test_keypad_repress_extends_hold() {
        let hold = Duration::from_millis(150);
        let start = Instant::now();
        let mut pad = Keypad::new();
        pad.press(0x7, start);
        pad.press(0x7, start + Duration::from_millis(100));
        pad.expire(start + Duration::from_millis(200), hold);
        assert_eq!(pad.state(), 1 << 7);
    }

    #[test]
    fn test_held_key_survives_repeat_delay() {
        // first press, then the terminal waits 500ms before repeating every 33ms
        let start = Instant::now();
        let mut pad = Keypad::new();
        pad.press(0x5, start);
        for ms in (0..=500).step_by(10) {
            pad.expire(start + Duration::from_millis(ms), KEY_HOLD);
            assert_eq!(pad.state(), 1 << 5, "released after {}ms", ms);
        }
        for repeat in 0..10 {
            let now = start + Duration::from_millis(500 + repeat * 33);
            pad.press(0x5, now);
            pad.expire(now, KEY_HOLD);
            assert_eq!(pad.state(), 1 << 5);
        }
    }

    #[test]
    fn test_keypad_ignores_unknown_keys() {
        let mut pad = Keypad::new();
        pad.press(0x10, Instant::now());
        assert_eq!(pad.state(), 0);
    }
}
