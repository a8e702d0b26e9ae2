//! Fixed-layout status screen
//!
//! Shows the clock, the current reading and the day's extrema. The layout is
//! sized for a 128x128 panel.

use core::fmt::Write;

use embedded_graphics::mono_font::{
    MonoTextStyle,
    ascii::{FONT_6X10, FONT_9X15, FONT_10X20},
};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use log::error;
use thiserror_no_std::Error;

use crate::time::{CalendarTime, DateText, TimeText};

/// Vertical position of each row in pixels
const HEADER_Y: i32 = 0;
const CURRENT_Y: i32 = 20;
const MAX_Y: i32 = 60;
const MIN_Y: i32 = 80;

pub type LineText = heapless::String<24>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenError {
    #[error("Screen is not available")]
    Unavailable,
    #[error("Drawing to the screen failed")]
    DrawFailed,
}

/// Everything the screen shows for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: DateText,
    pub time: TimeText,
    pub current: f32,
    pub max: Option<f32>,
    pub min: Option<f32>,
}

impl Snapshot {
    pub fn new(at: &CalendarTime, current: f32, max: Option<f32>, min: Option<f32>) -> Self {
        Self {
            date: at.date_text(),
            time: at.time_text(),
            current,
            max,
            min,
        }
    }

    /// `YYYY-MM-DD HH:MM:SS`
    pub fn header_line(&self) -> LineText {
        let mut line = LineText::new();
        let _ = write!(line, "{} {}", self.date, self.time);
        line
    }

    /// `T: 23.4 C`
    pub fn current_line(&self) -> LineText {
        labelled_celsius("T", Some(self.current))
    }

    /// `Max: 32.0 C`, or `Max: --.- C` before the first reading of the day
    pub fn max_line(&self) -> LineText {
        labelled_celsius("Max", self.max)
    }

    pub fn min_line(&self) -> LineText {
        labelled_celsius("Min", self.min)
    }
}

fn labelled_celsius(label: &str, value: Option<f32>) -> LineText {
    let mut line = LineText::new();
    let _ = match value {
        Some(celsius) => write!(line, "{}: {:.1} C", label, celsius),
        None => write!(line, "{}: --.- C", label),
    };
    line
}

/// A display that can show a [`Snapshot`].
pub trait Screen {
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), ScreenError>;
}

/// Draws snapshots onto any RGB565 draw target.
pub struct SnapshotScreen<D> {
    target: D,
}

impl<D> SnapshotScreen<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: core::fmt::Debug,
{
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    fn draw(&mut self, snapshot: &Snapshot) -> Result<(), D::Error> {
        self.target.clear(Rgb565::BLACK)?;

        let small = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
        let large = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
        let medium = MonoTextStyle::new(&FONT_9X15, Rgb565::WHITE);

        let rows = [
            (snapshot.header_line(), small, HEADER_Y),
            (snapshot.current_line(), large, CURRENT_Y),
            (snapshot.max_line(), medium, MAX_Y),
            (snapshot.min_line(), medium, MIN_Y),
        ];

        for (line, style, y) in rows.iter() {
            Text::with_baseline(line.as_str(), Point::new(0, *y), *style, Baseline::Top)
                .draw(&mut self.target)?;
        }

        Ok(())
    }
}

impl<D> Screen for SnapshotScreen<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: core::fmt::Debug,
{
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), ScreenError> {
        self.draw(snapshot).map_err(|e| {
            error!("Screen draw failed: {:?}", e);
            ScreenError::DrawFailed
        })
    }
}
