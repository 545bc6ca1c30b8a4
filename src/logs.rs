//! Terminal progress display for batch runs.

use std::io::{stderr, Error as IoError, Stderr, Write};
use std::num::NonZero;
use std::time::Instant;

/// Progress events drained by the display thread. Id 0 is the batch itself,
/// ids from 1 identify workers.
#[derive(Debug, Clone)]
pub enum LogEvent {
    Count(usize),
    Total(usize),
    Warn(usize, String),
    Status(usize, String),
    Error(usize, String),
    Done(usize, String),
}

#[derive(Debug, Clone)]
enum RowState {
    Running(String),
    Failed(String),
    Done(String),
}

impl Default for RowState {
    fn default() -> Self {
        Self::Running(String::new())
    }
}

/// One status row per worker plus a totals row, pinned to the bottom of the
/// terminal. Warnings scroll past above them.
#[derive(Debug)]
pub struct ProgressBar<T: Write> {
    n_workers: usize,
    tty: T,
    rows: Vec<RowState>,
    counts: Vec<usize>,
    total: usize,
    frame: usize,
    time: Instant,
}

impl ProgressBar<Stderr> {
    pub fn new_stderr(n_workers: NonZero<usize>) -> Result<Self, IoError> {
        Self::new(n_workers, stderr())
    }
}

impl<T: Write> ProgressBar<T> {
    const BAR_WIDTH: usize = 16;
    const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
    const FRAME_DURATION: f64 = 0.1;

    pub fn new(n_workers: NonZero<usize>, tty: T) -> Result<Self, IoError> {
        let n_workers = n_workers.get();
        let mut pbar = Self {
            n_workers,
            tty,
            rows: vec![RowState::default(); n_workers + 1],
            counts: vec![0; n_workers + 1],
            total: 0,
            frame: 0,
            time: Instant::now(),
        };
        // Reserve one line per row before drawing over them.
        for _ in 0..=n_workers {
            writeln!(pbar.tty)?;
        }
        pbar.show()?;
        Ok(pbar)
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn log(&mut self, event: LogEvent) -> Result<(), IoError> {
        match event {
            LogEvent::Warn(id, msg) => self.warn(id, msg)?,
            LogEvent::Status(id, msg) => self.rows[id] = RowState::Running(msg),
            LogEvent::Error(id, msg) => self.rows[id] = RowState::Failed(msg),
            LogEvent::Done(id, msg) => self.rows[id] = RowState::Done(msg),
            LogEvent::Count(0) => self.counts[0] += 1,
            LogEvent::Count(id) => {
                self.counts[0] += 1;
                self.counts[id] += 1;
            }
            LogEvent::Total(n) => self.set_total(n),
        }
        self.show()
    }

    /// Redraws spinners; throttled so rapid polling stays cheap.
    pub fn update(&mut self) -> Result<(), IoError> {
        let now = Instant::now();
        if now.duration_since(self.time).as_secs_f64() >= Self::FRAME_DURATION {
            self.time = now;
            self.frame = self.frame.wrapping_add(1);
            self.show()?;
        }
        Ok(())
    }

    fn warn(&mut self, id: usize, msg: String) -> Result<(), IoError> {
        let (_w, h) = termion::terminal_size()?;
        let y = h.saturating_sub(self.n_workers as u16 + 2);
        let up = termion::scroll::Up(1);
        let goto = termion::cursor::Goto(1, y);
        let dim = termion::color::Fg(termion::color::LightBlack);
        let color = termion::color::Fg(termion::color::LightYellow);
        let reset = termion::style::Reset;
        let clear = termion::clear::UntilNewline;
        let msg = msg.replace('\n', " ");
        if id > 0 {
            write!(
                self.tty,
                "{up}{goto}{dim}{id:02} {color}[WARN] {reset}{msg}{clear}"
            )
        } else {
            write!(
                self.tty,
                "{up}{goto}{dim}   {color}[WARN] {reset}{msg}{clear}"
            )
        }
    }

    fn show(&mut self) -> Result<(), IoError> {
        let (w, h) = termion::terminal_size()?;
        let y = h.saturating_sub(self.n_workers as u16 + 1);
        write!(self.tty, "{}", termion::cursor::Goto(1, y))?;
        for id in 1..=self.n_workers {
            self.show_worker(w, id)?;
        }
        self.show_total(w)?;
        self.tty.flush()
    }

    fn show_worker(&mut self, w: u16, id: usize) -> Result<(), IoError> {
        let (mark, color, msg) = match &self.rows[id] {
            RowState::Running(msg) => (
                Self::SPINNER[(self.frame + id) % Self::SPINNER.len()],
                termion::color::Blue.fg_str(),
                msg,
            ),
            RowState::Failed(msg) => ('!', termion::color::LightRed.fg_str(), msg),
            RowState::Done(msg) => ('=', termion::color::LightGreen.fg_str(), msg),
        };
        let dim = termion::color::Fg(termion::color::LightBlack);
        let reset = termion::style::Reset;
        let clear = termion::clear::UntilNewline;
        let n = self.counts[id];
        let msg = Self::ellipsize(msg, w, 14);
        writeln!(self.tty, "{dim}{id:02} {color}[{mark} {n:3}] {reset}{msg}{clear}")
    }

    fn show_total(&mut self, w: u16) -> Result<(), IoError> {
        let n = self.counts[0];
        let total = self.total;
        let (bar, color, msg) = match &self.rows[0] {
            RowState::Running(msg) => {
                let bar = if total > 0 {
                    let filled = (n as f64 / total as f64 * Self::BAR_WIDTH as f64).round() as usize;
                    format!(
                        "{}{}",
                        "#".repeat(filled),
                        ".".repeat(Self::BAR_WIDTH.saturating_sub(filled))
                    )
                } else {
                    // Total unknown yet: slide a block back and forth.
                    let mut cells = vec!['.'; Self::BAR_WIDTH];
                    let head = self.frame % Self::BAR_WIDTH;
                    for i in head..head + 3 {
                        cells[i % Self::BAR_WIDTH] = '#';
                    }
                    cells.into_iter().collect()
                };
                (bar, termion::color::LightBlue.fg_str(), msg)
            }
            RowState::Failed(msg) => (
                "!".repeat(Self::BAR_WIDTH),
                termion::color::LightRed.fg_str(),
                msg,
            ),
            RowState::Done(msg) => (
                "#".repeat(Self::BAR_WIDTH),
                termion::color::LightGreen.fg_str(),
                msg,
            ),
        };
        let reset = termion::style::Reset;
        let clear = termion::clear::UntilNewline;
        let msg = Self::ellipsize(msg, w, Self::BAR_WIDTH as u16 + 12);
        if total > 0 {
            writeln!(self.tty, "{color}[{bar} {n:3}/{total:3}] {reset}{msg}{clear}")
        } else {
            writeln!(self.tty, "{color}[{bar} {n:3}] {reset}{msg}{clear}")
        }
    }

    fn ellipsize(s: &str, w: u16, used: u16) -> String {
        let room = w.saturating_sub(used) as usize;
        if s.chars().count() > room {
            let cut: String = s.chars().take(room.saturating_sub(3)).collect();
            format!("{cut}...")
        } else {
            s.to_string()
        }
    }
}
