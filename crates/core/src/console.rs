//! Terminal collaborators injected into the session machine, plus a
//! scripted implementation for headless runs and tests.

use std::{collections::VecDeque, time::Duration};

use anyhow::{anyhow, Result};

use crate::desktop::DesktopScene;

/// A single keystroke as the core sees it.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Backspace,
    Esc,
    Char(char),
    /// Anything the core has no binding for.
    Other,
}

/// Console colors the core draws with.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    Gray,
    DarkGray,
    White,
}

/// Line-oriented input/output.
pub trait Console {
    /// Block until a full line is entered; the newline is not included.
    fn read_line(&mut self) -> Result<String>;
    /// Block until a single key is pressed.
    fn read_key(&mut self) -> Result<Key>;
    /// Write text without a trailing newline.
    fn write(&mut self, text: &str) -> Result<()>;
    /// Clear the screen and home the cursor.
    fn clear(&mut self) -> Result<()>;
    /// Set the foreground color for subsequent writes.
    fn set_foreground(&mut self, color: Color) -> Result<()>;
    /// Set the background color for subsequent writes.
    fn set_background(&mut self, color: Color) -> Result<()>;
    /// Sleep; scripted consoles skip this.
    fn pause(&mut self, duration: Duration) -> Result<()>;

    /// Write text followed by a newline.
    fn write_line(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.write("\n")
    }

    /// Restore white-on-black.
    fn reset_colors(&mut self) -> Result<()> {
        self.set_foreground(Color::White)?;
        self.set_background(Color::Black)
    }

    /// Write one line in `color`, then return to white.
    fn write_colored(&mut self, color: Color, text: &str) -> Result<()> {
        self.set_foreground(color)?;
        self.write_line(text)?;
        self.set_foreground(Color::White)
    }
}

/// One pointer frame as sampled by the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerSample {
    /// Horizontal position in desktop coordinates.
    pub x: i32,
    /// Vertical position in desktop coordinates.
    pub y: i32,
    /// Whether the primary button is held.
    pub pressed: bool,
    /// A key pressed during the frame, if any.
    pub key: Option<Key>,
}

/// Pointer input and frame presentation for the GUI mode.
pub trait Desktop {
    /// Wait one frame and report the pointer state.
    fn sample_pointer(&mut self) -> Result<PointerSample>;
    /// Draw the scene for this frame.
    fn present(&mut self, scene: &DesktopScene) -> Result<()>;
}

/// Everything the session machine needs from its host.
pub trait Terminal: Console + Desktop {}

impl<T: Console + Desktop + ?Sized> Terminal for T {}

/// Queued input for [`ScriptedConsole`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    Line(String),
    Key(Key),
    Pointer(PointerSample),
}

/// Console and desktop driven by a fixed script, recording all output.
///
/// Reads fail once the script is exhausted or when the next queued item is
/// of the wrong kind, which ends a headless run deterministically.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<Scripted>,
    transcript: String,
    clears: usize,
    paused: Duration,
    foreground: Option<Color>,
    background: Option<Color>,
    scenes: Vec<DesktopScene>,
}

impl ScriptedConsole {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a line.
    pub fn line(mut self, text: &str) -> Self {
        self.push_line(text);
        self
    }

    /// Queue several lines.
    pub fn lines<'a>(mut self, lines: impl IntoIterator<Item = &'a str>) -> Self {
        for line in lines {
            self.push_line(line);
        }
        self
    }

    /// Queue a keystroke.
    pub fn key(mut self, key: Key) -> Self {
        self.push_key(key);
        self
    }

    /// Queue a pointer frame.
    pub fn pointer(mut self, x: i32, y: i32, pressed: bool) -> Self {
        self.input.push_back(Scripted::Pointer(PointerSample {
            x,
            y,
            pressed,
            key: None,
        }));
        self
    }

    /// Append a line to a console already in use.
    pub fn push_line(&mut self, text: &str) {
        self.input.push_back(Scripted::Line(text.to_string()));
    }

    /// Append a keystroke to a console already in use.
    pub fn push_key(&mut self, key: Key) {
        self.input.push_back(Scripted::Key(key));
    }

    /// Append a pointer frame to a console already in use.
    pub fn push_pointer(&mut self, sample: PointerSample) {
        self.input.push_back(Scripted::Pointer(sample));
    }

    /// Items not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Everything written so far.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Return and forget everything written so far.
    pub fn take_transcript(&mut self) -> String {
        std::mem::take(&mut self.transcript)
    }

    /// Number of clear-screen calls.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Total requested pause time.
    pub fn paused(&self) -> Duration {
        self.paused
    }

    /// Last foreground color set.
    pub fn foreground(&self) -> Option<Color> {
        self.foreground
    }

    /// Last background color set.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Scenes presented so far.
    pub fn scenes(&self) -> &[DesktopScene] {
        &self.scenes
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self) -> Result<String> {
        match self.input.pop_front() {
            Some(Scripted::Line(line)) => {
                self.transcript.push_str(&line);
                self.transcript.push('\n');
                Ok(line)
            }
            Some(other) => Err(anyhow!("script expected a line, found {other:?}")),
            None => Err(anyhow!("script exhausted")),
        }
    }

    fn read_key(&mut self) -> Result<Key> {
        match self.input.pop_front() {
            Some(Scripted::Key(key)) => Ok(key),
            Some(other) => Err(anyhow!("script expected a key, found {other:?}")),
            None => Err(anyhow!("script exhausted")),
        }
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.transcript.push_str(text);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn set_foreground(&mut self, color: Color) -> Result<()> {
        self.foreground = Some(color);
        Ok(())
    }

    fn set_background(&mut self, color: Color) -> Result<()> {
        self.background = Some(color);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> Result<()> {
        self.paused += duration;
        Ok(())
    }
}

impl Desktop for ScriptedConsole {
    fn sample_pointer(&mut self) -> Result<PointerSample> {
        match self.input.pop_front() {
            Some(Scripted::Pointer(sample)) => Ok(sample),
            Some(Scripted::Key(key)) => Ok(PointerSample {
                key: Some(key),
                ..PointerSample::default()
            }),
            Some(other) => Err(anyhow!("script expected a pointer frame, found {other:?}")),
            None => Err(anyhow!("script exhausted")),
        }
    }

    fn present(&mut self, scene: &DesktopScene) -> Result<()> {
        self.scenes.push(scene.clone());
        Ok(())
    }
}
