use std::io;

use tui::backend::{Backend, CrosstermBackend};
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

use crate::framebuffer::{CHIP8_DISPLAY_BYTES, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH};

/// Display is used by the host to put the framebuffer on a screen. It gets
/// the framebuffer packed one bit per pixel, row-major, MSB first, so a
/// variety of kinds of screen would work.
pub trait Display {
    /// draw data based on internal resolution of display
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;
}

// store useful metadata about the screen: width, height, bitplanes
struct Resolution(usize, usize, usize);

impl Resolution {
    fn chip8() -> Self {
        Resolution(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT, 1)
    }

    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// (x, y) canvas coords of every pixel whose bit equals `bitplane`;
    /// y is negated because the canvas grows upwards
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI; crossterm on stdout
/// unless some other backend is handed in
pub struct MonoTermDisplay<B: Backend = CrosstermBackend<io::Stdout>> {
    terminal: Terminal<B>,
    resolution: Resolution,
    title: String,
}

impl MonoTermDisplay {
    pub fn new(title: &str) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        MonoTermDisplay::with_terminal(Terminal::new(backend)?, title)
    }
}

impl<B: Backend> MonoTermDisplay<B> {
    pub fn with_terminal(mut terminal: Terminal<B>, title: &str) -> Result<Self, io::Error> {
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution::chip8(),
            title: title.to_string(),
        })
    }
}

impl<B: Backend> Drop for MonoTermDisplay<B> {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl<B: Backend> Display for MonoTermDisplay<B> {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        if data.len() != self.resolution.byte_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "MonoTermDisplay needs {} bytes to draw, got {}",
                    self.resolution.byte_count(),
                    data.len()
                ),
            ));
        }

        // 1:1 between terminal cells and chip8 pixels when there's room; a
        // smaller terminal gets a squashed canvas rather than a panic
        let resolution = &self.resolution;
        let title = self.title.as_str();
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16)
                .intersection(f.size());

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // only lit pixels need drawing; the block background is black
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; keeps the last frame it was given
pub struct DummyDisplay {
    frames: usize,
    last: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay {
            frames: 0,
            last: vec![0; CHIP8_DISPLAY_BYTES],
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn last_frame(&self) -> &[u8] {
        &self.last
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.frames += 1;
        self.last.clear();
        self.last.extend_from_slice(data);
        Ok(())
    }
}
