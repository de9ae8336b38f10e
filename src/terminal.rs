//! Terminal display and keyboard input
//!
//! Frames are shown with 24-bit color using upper half block cells: the
//! foreground paints the top pixel and the background the bottom one, so
//! each text row carries two pixel rows. Frames larger than the terminal
//! are downscaled by a whole factor with nearest-neighbor sampling.

use crate::compositor::{FrameInfo, Presenter};
use crate::input::{EventSource, HeldKey, InputEvent, Key, Notice, HELP_TEXT};
use crate::surface::Raster;
use crossterm::cursor::{self, MoveTo};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use image::{Rgb, RgbaImage};
use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

/// ANSI escape sequence to reset all formatting
pub const ANSI_RESET: &str = "\x1b[0m";

const HALF_BLOCK: char = '\u{2580}';

/// Rows reserved below the frame for the status bar.
const STATUS_ROWS: u16 = 1;

/// One text cell: the colors of its top and bottom pixel.
pub type Cell = (Rgb<u8>, Rgb<u8>);

/// A frame sampled down to terminal cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    pub cols: u16,
    pub rows: u16,
    pub cells: Vec<Cell>,
}

/// Smallest whole downscale factor that fits `size` pixels into the cells.
pub fn scale_factor(size: (u32, u32), max_cols: u16, max_rows: u16) -> u32 {
    let cols = u32::from(max_cols.max(1));
    let pixel_rows = u32::from(max_rows.max(1)) * 2;
    size.0.div_ceil(cols).max(size.1.div_ceil(pixel_rows)).max(1)
}

impl CellGrid {
    /// Sample `image` to fit within `max_cols` x `max_rows` cells.
    ///
    /// Transparent pixels and pixels past the bottom edge are black.
    pub fn sample(image: &RgbaImage, max_cols: u16, max_rows: u16) -> Self {
        let (width, height) = image.dimensions();
        let factor = scale_factor((width, height), max_cols, max_rows);
        let cols = width.div_ceil(factor);
        let rows = height.div_ceil(factor * 2);

        let pixel = |x: u32, y: u32| -> Rgb<u8> {
            match image.get_pixel_checked(x, y) {
                Some(p) if p[3] > 0 => Rgb([p[0], p[1], p[2]]),
                _ => Rgb([0, 0, 0]),
            }
        };

        let mut cells = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let x = col * factor;
                let top = row * 2 * factor;
                cells.push((pixel(x, top), pixel(x, top + factor)));
            }
        }

        Self {
            cols: cols as u16,
            rows: rows as u16,
            cells,
        }
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row as usize * self.cols as usize + col as usize).copied()
    }

    /// Render as ANSI escape sequences, one line per cell row.
    pub fn to_ansi(&self) -> String {
        let mut output = String::new();
        for row in self.cells.chunks(self.cols.max(1) as usize) {
            for (top, bottom) in row {
                output.push_str(&color_to_ansi_bg(*bottom));
                output.push_str(&format!("\x1b[38;2;{};{};{}m{}", top[0], top[1], top[2], HALF_BLOCK));
            }
            output.push_str(ANSI_RESET);
            output.push('\n');
        }
        output
    }
}

/// Convert a color to an ANSI 24-bit background escape sequence.
///
/// ```
/// use pixelturtle::terminal::color_to_ansi_bg;
/// use image::Rgb;
///
/// assert_eq!(color_to_ansi_bg(Rgb([255, 0, 0])), "\x1b[48;2;255;0;0m");
/// ```
pub fn color_to_ansi_bg(rgb: Rgb<u8>) -> String {
    format!("\x1b[48;2;{};{};{}m", rgb[0], rgb[1], rgb[2])
}

/// Render a whole frame for printing, fitting it into `max_cols` columns.
pub fn render_frame_ansi(frame: &RgbaImage, max_cols: u16) -> String {
    if frame.width() == 0 || frame.height() == 0 {
        return String::new();
    }
    CellGrid::sample(frame, max_cols, u16::MAX).to_ansi()
}

/// One-line summary of the turtle that rendered the frame.
pub fn status_line(info: &FrameInfo, notice: Option<&str>) -> String {
    let mut line = format!(
        "heading {:>5.1}  at ({:.0}, {:.0})  pen {}  {} on {}  width {}  speed {}  turtles {}",
        info.heading,
        info.position.0,
        info.position.1,
        if info.pen_down { "down" } else { "up" },
        info.pen_color,
        info.background,
        info.thickness,
        info.speed,
        info.actors,
    );
    if let Some(notice) = notice {
        line.push_str("  | ");
        line.push_str(notice);
    }
    line
}

fn rgb_color(rgb: Rgb<u8>) -> Color {
    Color::Rgb {
        r: rgb[0],
        g: rgb[1],
        b: rgb[2],
    }
}

/// Draws frames into a terminal, rewriting only cells that changed.
pub struct TerminalPresenter<W: Write = BufWriter<Stdout>> {
    out: W,
    /// Fixed terminal size; `None` queries the real terminal every frame
    size: Option<(u16, u16)>,
    back: Vec<Option<Cell>>,
    back_cols: u16,
    last_info: Option<FrameInfo>,
    notice: Option<String>,
}

impl TerminalPresenter {
    /// A presenter writing to stdout, sized to the terminal.
    pub fn stdout() -> Self {
        Self {
            out: BufWriter::with_capacity(1 << 16, io::stdout()),
            size: None,
            back: Vec::new(),
            back_cols: 0,
            last_info: None,
            notice: None,
        }
    }
}

impl<W: Write> TerminalPresenter<W> {
    /// A presenter writing to `out` as if the terminal were `cols` x `rows`.
    pub fn with_writer(out: W, cols: u16, rows: u16) -> Self {
        Self {
            out,
            size: Some((cols, rows)),
            back: Vec::new(),
            back_cols: 0,
            last_info: None,
            notice: None,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn terminal_size(&self) -> (u16, u16) {
        self.size.unwrap_or_else(|| terminal::size().unwrap_or((80, 24)))
    }

    fn draw(&mut self, frame: &Raster, info: &FrameInfo) -> io::Result<()> {
        let (cols, rows) = self.terminal_size();
        let grid = CellGrid::sample(frame.image(), cols, rows.saturating_sub(STATUS_ROWS));

        if grid.cols != self.back_cols || self.back.len() != grid.cells.len() {
            queue!(self.out, ResetColor, Clear(ClearType::All))?;
            self.back = vec![None; grid.cells.len()];
            self.back_cols = grid.cols;
        }

        for row in 0..grid.rows {
            let mut cursor_ok = false;
            for col in 0..grid.cols {
                let index = row as usize * grid.cols as usize + col as usize;
                let cell = grid.cells[index];
                if self.back[index] == Some(cell) {
                    cursor_ok = false;
                    continue;
                }
                if !cursor_ok {
                    queue!(self.out, MoveTo(col, row))?;
                    cursor_ok = true;
                }
                queue!(
                    self.out,
                    SetForegroundColor(rgb_color(cell.0)),
                    SetBackgroundColor(rgb_color(cell.1)),
                    Print(HALF_BLOCK)
                )?;
                self.back[index] = Some(cell);
            }
        }

        self.last_info = Some(info.clone());
        self.draw_status(grid.rows, cols)?;
        self.out.flush()
    }

    fn draw_status(&mut self, row: u16, cols: u16) -> io::Result<()> {
        let Some(info) = &self.last_info else {
            return Ok(());
        };
        let line: String = status_line(info, self.notice.as_deref()).chars().take(cols as usize).collect();
        queue!(
            self.out,
            ResetColor,
            MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            Print(line)
        )
    }

    fn draw_help(&mut self) -> io::Result<()> {
        queue!(self.out, ResetColor)?;
        for (row, text) in HELP_TEXT.lines().enumerate() {
            queue!(self.out, MoveTo(0, row as u16), Print(format!("{:<40}", text)))?;
        }
        // The overlay covered the top rows; repaint them on the next frame
        let covered = HELP_TEXT.lines().count() * self.back_cols as usize;
        for cell in self.back.iter_mut().take(covered) {
            *cell = None;
        }
        self.out.flush()
    }

    fn show_notice(&mut self, notice: &Notice) -> io::Result<()> {
        match notice {
            Notice::Help => self.draw_help(),
            Notice::UnusedKey(_) => {
                self.notice = Some(notice.to_string());
                let (cols, rows) = self.terminal_size();
                let status_row = if self.back_cols == 0 {
                    0
                } else {
                    (self.back.len() / self.back_cols as usize) as u16
                };
                self.draw_status(status_row.min(rows.saturating_sub(1)), cols)?;
                self.out.flush()
            }
        }
    }
}

impl<W: Write> Presenter<Raster> for TerminalPresenter<W> {
    fn present(&mut self, frame: &Raster, info: &FrameInfo) {
        if let Err(e) = self.draw(frame, info) {
            tracing::warn!("failed to draw frame: {}", e);
        }
    }

    fn notify(&mut self, notice: &Notice) {
        if let Err(e) = self.show_notice(notice) {
            tracing::warn!("failed to show notice: {}", e);
        }
    }
}

/// Puts the terminal into interactive mode and restores it on drop.
pub struct TerminalGuard {
    enhanced_keyboard: bool,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;

        // Release events need the keyboard enhancement protocol
        let enhanced_keyboard = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if enhanced_keyboard {
            execute!(
                out,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        }
        tracing::info!("terminal ready (key release events: {})", enhanced_keyboard);

        Ok(Self { enhanced_keyboard })
    }

    /// Whether the terminal reports key releases.
    pub fn reports_key_release(&self) -> bool {
        self.enhanced_keyboard
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if self.enhanced_keyboard {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Map a crossterm key code to a [`Key`].
pub fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Esc => Key::Escape,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        other => Key::Other(format!("{:?}", other)),
    }
}

/// Translate one terminal event. Auto-repeats and non-key events are dropped.
pub fn translate(event: Event) -> Option<InputEvent> {
    let Event::Key(KeyEvent {
        code, modifiers, kind, ..
    }) = event
    else {
        return None;
    };

    if modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c') | KeyCode::Char('C')) {
        return (kind == KeyEventKind::Press).then_some(InputEvent::Close);
    }

    match kind {
        KeyEventKind::Press => Some(InputEvent::KeyDown(map_key(code))),
        KeyEventKind::Release => Some(InputEvent::KeyUp(map_key(code))),
        KeyEventKind::Repeat => None,
    }
}

/// A key-up for every held-motion key pressed in `events`.
///
/// Terminals without release reporting send repeated presses while a key
/// is held. These key-ups are delivered with the following batch, so each
/// press holds its key for exactly one tick.
pub fn synthesized_key_ups(events: &[InputEvent]) -> Vec<InputEvent> {
    let mut released: Vec<InputEvent> = Vec::new();
    for event in events {
        if let InputEvent::KeyDown(key) = event {
            let up = InputEvent::KeyUp(key.clone());
            if HeldKey::from_key(key).is_some() && !released.contains(&up) {
                released.push(up);
            }
        }
    }
    released
}

/// Keyboard events read from the terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalEvents {
    reports_release: bool,
    /// Key-ups owed from the previous batch
    pending: Vec<InputEvent>,
}

impl TerminalEvents {
    pub fn new(reports_release: bool) -> Self {
        Self {
            reports_release,
            pending: Vec::new(),
        }
    }

    /// Prefix the key-ups owed from the last batch and queue this batch's.
    fn complete_batch(&mut self, read: Vec<InputEvent>) -> Vec<InputEvent> {
        if self.reports_release {
            return read;
        }
        let next = synthesized_key_ups(&read);
        let mut events = std::mem::replace(&mut self.pending, next);
        events.extend(read);
        events
    }
}

impl EventSource for TerminalEvents {
    fn poll_events(&mut self, timeout: Duration) -> io::Result<Vec<InputEvent>> {
        let mut read = Vec::new();
        let mut wait = timeout;
        while event::poll(wait)? {
            if let Some(input) = translate(event::read()?) {
                read.push(input);
            }
            wait = Duration::ZERO;
        }
        Ok(self.complete_batch(read))
    }
}
