use std::{
    io::{self, Stdout, Write},
    thread,
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self as term, disable_raw_mode, enable_raw_mode, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use lebirun_core::{
    desktop::{DesktopScene, SCREEN_HEIGHT, SCREEN_WIDTH},
    power::Power,
    Color, Console, Desktop, Key, PointerSample, PowerLatch,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal as Screen};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::desktop::{self, Theme};

/// One desktop frame lasts one input tick.
const TICK_RATE: Duration = Duration::from_millis(60);

enum HostEvent {
    Input(Event),
    Tick,
}

/// Real terminal behind the session machine.
///
/// Text modes run in raw mode on the main screen with local line editing.
/// The GUI mode switches to the alternate screen with mouse capture and
/// switches back the first time a text operation is used again.
pub struct CrosstermTerminal {
    stdout: Stdout,
    events: mpsc::Receiver<HostEvent>,
    screen: Option<Screen<CrosstermBackend<Stdout>>>,
    theme: Theme,
    pointer: PointerSample,
    release_pending: bool,
    size: (u16, u16),
    interrupt: PowerLatch,
}

impl CrosstermTerminal {
    /// Enter raw mode and start the input thread. Ctrl+C requests a
    /// shutdown through `interrupt`.
    pub fn start(interrupt: PowerLatch) -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let size = term::size().unwrap_or((80, 24));
        let (sender, events) = mpsc::channel(64);
        spawn_input_thread(sender);
        info!(width = size.0, height = size.1, "terminal ready");
        Ok(Self {
            stdout: io::stdout(),
            events,
            screen: None,
            theme: Theme::default(),
            pointer: PointerSample::default(),
            release_pending: false,
            size,
            interrupt,
        })
    }

    /// Leave every mode this terminal switched on.
    pub fn restore(&mut self) -> Result<()> {
        self.leave_desktop()?;
        execute!(self.stdout, ResetColor, Show).context("failed to reset terminal")?;
        disable_raw_mode().context("failed to disable raw mode")?;
        Ok(())
    }

    fn next_event(&mut self) -> Result<HostEvent> {
        self.events
            .blocking_recv()
            .ok_or_else(|| anyhow!("input thread stopped"))
    }

    /// Next key press, or `None` once Ctrl+C has been turned into a shutdown.
    fn next_key(&mut self) -> Result<Option<Key>> {
        loop {
            match self.next_event()? {
                HostEvent::Input(Event::Key(event)) if event.kind != KeyEventKind::Release => {
                    if is_interrupt(&event) {
                        info!("interrupt received");
                        self.interrupt.shutdown();
                        return Ok(None);
                    }
                    return Ok(Some(map_key(event.code)));
                }
                HostEvent::Input(Event::Resize(width, height)) => self.size = (width, height),
                _ => {}
            }
        }
    }

    fn enter_desktop(&mut self) -> Result<()> {
        if self.screen.is_some() {
            return Ok(());
        }
        execute!(self.stdout, EnterAlternateScreen, EnableMouseCapture, Hide)
            .context("failed to enter the desktop screen")?;
        let screen = Screen::new(CrosstermBackend::new(io::stdout()))
            .context("failed to create desktop screen")?;
        self.screen = Some(screen);
        self.pointer = PointerSample::default();
        self.release_pending = false;
        debug!("desktop screen entered");
        Ok(())
    }

    fn leave_desktop(&mut self) -> Result<()> {
        if let Some(mut screen) = self.screen.take() {
            execute!(
                screen.backend_mut(),
                DisableMouseCapture,
                LeaveAlternateScreen
            )
            .context("failed to leave the desktop screen")?;
            screen.show_cursor()?;
            debug!("desktop screen left");
        }
        Ok(())
    }

    fn area(&self) -> Rect {
        Rect::new(0, 0, self.size.0.max(1), self.size.1.max(1))
    }
}

impl Console for CrosstermTerminal {
    fn read_line(&mut self) -> Result<String> {
        self.leave_desktop()?;
        execute!(self.stdout, Show)?;
        let mut editor = LineEditor::default();
        let line = loop {
            match editor.feed(self.next_key()?) {
                LineEdit::Echo(text) => execute!(self.stdout, Print(text))?,
                LineEdit::Pending => {}
                LineEdit::Done(line) => break line,
            }
        };
        execute!(self.stdout, Print("\r\n"))?;
        Ok(line)
    }

    fn read_key(&mut self) -> Result<Key> {
        self.leave_desktop()?;
        Ok(self.next_key()?.unwrap_or(Key::Esc))
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.leave_desktop()?;
        queue!(self.stdout, Print(text.replace('\n', "\r\n")))?;
        self.stdout.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.leave_desktop()?;
        execute!(self.stdout, term::Clear(term::ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    fn set_foreground(&mut self, color: Color) -> Result<()> {
        queue!(self.stdout, SetForegroundColor(map_color(color)))?;
        Ok(())
    }

    fn set_background(&mut self, color: Color) -> Result<()> {
        queue!(self.stdout, SetBackgroundColor(map_color(color)))?;
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> Result<()> {
        self.stdout.flush()?;
        thread::sleep(duration);
        Ok(())
    }
}

impl Desktop for CrosstermTerminal {
    fn sample_pointer(&mut self) -> Result<PointerSample> {
        self.enter_desktop()?;
        if self.release_pending {
            self.pointer.pressed = false;
            self.release_pending = false;
        }
        self.pointer.key = None;
        let mut clicked = false;
        loop {
            match self.next_event()? {
                HostEvent::Tick => break,
                HostEvent::Input(Event::Resize(width, height)) => self.size = (width, height),
                HostEvent::Input(Event::Mouse(mouse)) => {
                    let (x, y) =
                        desktop::pixel_of(mouse.column, mouse.row, SCREEN_WIDTH, SCREEN_HEIGHT, self.area());
                    self.pointer.x = x;
                    self.pointer.y = y;
                    match mouse.kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            self.pointer.pressed = true;
                            clicked = true;
                        }
                        // A click inside one frame still has to be seen held once.
                        MouseEventKind::Up(MouseButton::Left) if clicked => {
                            self.release_pending = true;
                        }
                        MouseEventKind::Up(MouseButton::Left) => self.pointer.pressed = false,
                        _ => {}
                    }
                }
                HostEvent::Input(Event::Key(event)) if event.kind != KeyEventKind::Release => {
                    if is_interrupt(&event) {
                        info!("interrupt received");
                        self.interrupt.shutdown();
                        self.pointer.key = Some(Key::Esc);
                    } else {
                        self.pointer.key = Some(map_key(event.code));
                    }
                    break;
                }
                HostEvent::Input(_) => {}
            }
        }
        Ok(self.pointer)
    }

    fn present(&mut self, scene: &DesktopScene) -> Result<()> {
        self.enter_desktop()?;
        let theme = &self.theme;
        if let Some(screen) = self.screen.as_mut() {
            screen
                .draw(|frame| desktop::draw(frame, scene, theme))
                .context("failed to draw desktop")?;
        }
        Ok(())
    }
}

enum LineEdit {
    Pending,
    Echo(String),
    Done(String),
}

/// Local line editing for raw mode. An interrupt (`None`) drops whatever
/// was typed so the half-entered line never runs.
#[derive(Default)]
struct LineEditor {
    buffer: String,
}

impl LineEditor {
    fn feed(&mut self, key: Option<Key>) -> LineEdit {
        match key {
            None => {
                self.buffer.clear();
                LineEdit::Done(String::new())
            }
            Some(Key::Enter) => LineEdit::Done(std::mem::take(&mut self.buffer)),
            Some(Key::Backspace) => match self.buffer.pop() {
                Some(_) => LineEdit::Echo("\u{8} \u{8}".to_string()),
                None => LineEdit::Pending,
            },
            Some(Key::Char(ch)) => {
                self.buffer.push(ch);
                LineEdit::Echo(ch.to_string())
            }
            Some(_) => LineEdit::Pending,
        }
    }
}

fn spawn_input_thread(sender: mpsc::Sender<HostEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(HostEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(HostEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn is_interrupt(event: &KeyEvent) -> bool {
    event.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(event.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Esc,
        KeyCode::Char(ch) => Key::Char(ch),
        _ => Key::Other,
    }
}

fn map_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::Blue => style::Color::DarkBlue,
        Color::Green => style::Color::Green,
        Color::Cyan => style::Color::Cyan,
        Color::Red => style::Color::Red,
        Color::Magenta => style::Color::Magenta,
        Color::Yellow => style::Color::Yellow,
        Color::Gray => style::Color::Grey,
        Color::DarkGray => style::Color::DarkGrey,
        Color::White => style::Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossterm_terminal_drives_a_session() {
        fn assert_terminal<T: lebirun_core::Terminal>() {}
        assert_terminal::<CrosstermTerminal>();
    }

    #[test]
    fn keys_map_to_console_keys() {
        assert_eq!(map_key(KeyCode::Char('q')), Key::Char('q'));
        assert_eq!(map_key(KeyCode::Enter), Key::Enter);
        assert_eq!(map_key(KeyCode::F(5)), Key::Other);
    }

    #[test]
    fn ctrl_c_is_an_interrupt_but_plain_c_is_not() {
        let ctrl = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let plain = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert!(is_interrupt(&ctrl));
        assert!(!is_interrupt(&plain));
    }

    fn type_line(editor: &mut LineEditor, text: &str) {
        for ch in text.chars() {
            assert!(matches!(editor.feed(Some(Key::Char(ch))), LineEdit::Echo(_)));
        }
    }

    #[test]
    fn enter_submits_the_edited_buffer() {
        let mut editor = LineEditor::default();
        type_line(&mut editor, "rebootx");
        assert!(matches!(editor.feed(Some(Key::Backspace)), LineEdit::Echo(_)));
        assert!(matches!(editor.feed(Some(Key::Up)), LineEdit::Pending));
        match editor.feed(Some(Key::Enter)) {
            LineEdit::Done(line) => assert_eq!(line, "reboot"),
            _ => panic!("enter should finish the line"),
        }
    }

    #[test]
    fn interrupt_discards_the_half_typed_line() {
        let mut editor = LineEditor::default();
        type_line(&mut editor, "reboot");
        match editor.feed(None) {
            LineEdit::Done(line) => assert!(line.is_empty()),
            _ => panic!("interrupt should finish the line"),
        }
        match editor.feed(Some(Key::Enter)) {
            LineEdit::Done(line) => assert!(line.is_empty()),
            _ => panic!("enter should finish the line"),
        }
    }

    #[test]
    fn backspace_on_empty_buffer_echoes_nothing() {
        let mut editor = LineEditor::default();
        assert!(matches!(editor.feed(Some(Key::Backspace)), LineEdit::Pending));
    }

    #[test]
    fn gray_stays_distinct_from_dark_gray() {
        assert_ne!(map_color(Color::Gray), map_color(Color::DarkGray));
    }
}
