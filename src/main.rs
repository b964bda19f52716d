use std::error::Error;
use std::fs::File;
use std::io::Read;

use clap::Parser;
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

use chip8::config::{Args, Config};
use chip8::display::MonoTermDisplay;
use chip8::environment::Environment;
use chip8::input::StdinInput;
use chip8::machine::Machine;
use chip8::sound::{Mute, SimpleBeep, Sound};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    SimpleLogger::new()
        .with_level(LevelFilter::from(args.log_level))
        .init()?;
    let config = Config::from(&args);

    // load a program
    let mut image = Vec::new();
    File::open(&args.rom)?.read_to_end(&mut image)?;
    let (machine, report) = Machine::load(&image);
    if report.is_truncated() {
        warn!(
            "{} was truncated: only the first {} bytes fit, {} dropped",
            args.rom.display(),
            report.loaded,
            report.truncated
        );
    }
    info!("loaded {} bytes from {}", report.loaded, args.rom.display());

    // initialise
    let mut display = MonoTermDisplay::new(&args.rom.display().to_string())?;
    let mut input = StdinInput::new()?;
    let mut sound: Box<dyn Sound> = if config.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    let exit = Environment::new(
        machine,
        config,
        &mut display,
        &mut input,
        sound.as_mut(),
    )
    .main_loop();

    if sound.is_playing() {
        sound.stop_tone()?;
    }
    drop(input);
    drop(display);
    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    info!("finished: {:?}", exit);
    exit?;
    Ok(())
}
