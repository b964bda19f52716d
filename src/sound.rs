use beep::beep;
use log::debug;

use crate::error::HostError;

/// makes the CHIP-8's single tone; on while the sound timer is running
pub trait Sound {
    fn start_tone(&mut self) -> Result<(), HostError>;
    fn stop_tone(&mut self) -> Result<(), HostError>;
    fn is_playing(&self) -> bool;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker beep via the `beep` crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn start_tone(&mut self) -> Result<(), HostError> {
        beep(SIMPLEBEEP_PITCH).map_err(|e| HostError::Audio(e.to_string()))?;
        debug!("tone on at {}Hz", SIMPLEBEEP_PITCH);
        self.is_beeping = true;
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), HostError> {
        beep(0).map_err(|e| HostError::Audio(e.to_string()))?;
        debug!("tone off");
        self.is_beeping = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.is_beeping
    }
}

/// silence; remembers whether it would be playing so tests can check
#[derive(Default)]
pub struct Mute {
    playing: bool,
    started: usize,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }

    /// how many times a tone has been started
    pub fn started(&self) -> usize {
        self.started
    }
}

impl Sound for Mute {
    fn start_tone(&mut self) -> Result<(), HostError> {
        self.playing = true;
        self.started += 1;
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), HostError> {
        self.playing = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mute_tracks_state() -> Result<(), HostError> {
        let mut s = Mute::new();
        assert!(!s.is_playing());
        s.start_tone()?;
        assert!(s.is_playing());
        s.stop_tone()?;
        assert!(!s.is_playing());
        assert_eq!(s.started(), 1);
        Ok(())
    }
}
