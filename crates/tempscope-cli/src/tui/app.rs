//! Full-screen frontend: owns the terminal while the monitor runs.
//!
//! The monitor loop drives everything. This side only draws the latest
//! frame, watches the keyboard while the loop waits out the poll interval,
//! and asks the stop question in a popup.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use serde::Serialize;

use tempscope_core::monitor::{next_tick, wait_deadline};
use tempscope_core::{Decision, Frontend, Interrupt, SeriesFrame, TemperatureUnit, View};

use super::theme::Theme;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Owned copy of the last rendered frame. Drawn on every redraw and written
/// out as JSON on `s`.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub cycle: u64,
    pub unit: TemperatureUnit,
    pub interval_secs: f64,
    pub frames: Vec<SeriesFrame>,
    pub pending: usize,
    pub threshold: usize,
    pub rows_written: u64,
    pub output: Option<String>,
    pub errors: Vec<String>,
}

impl Snapshot {
    pub fn from_view(view: &View<'_>) -> Self {
        Self {
            cycle: view.report.cycle,
            unit: view.unit,
            interval_secs: view.interval.as_secs_f64(),
            frames: view.frames.to_vec(),
            pending: view.buffer.pending_count(),
            threshold: view.buffer.threshold(),
            rows_written: view.buffer.rows_written(),
            output: view.buffer.output().map(|p| p.display().to_string()),
            errors: view.report.errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// Write as pretty JSON to `tempscope-snapshot-<epoch>.json` in `dir`.
    pub fn export(&self, dir: &std::path::Path) -> io::Result<PathBuf> {
        let epoch = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let path = dir.join(format!("tempscope-snapshot-{epoch}.json"));
        let contents = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// TuiState
// ---------------------------------------------------------------------------

/// Everything `ui::draw` reads.
#[derive(Debug, Default)]
pub struct TuiState {
    pub snapshot: Option<Snapshot>,
    pub theme: Theme,
    pub prompting: bool,
    pub notice: Option<String>,
}

/// What a key press asks for while the loop is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Interrupt,
    Export,
    Ignore,
}

pub fn key_action(key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Interrupt,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Interrupt
        }
        KeyCode::Char('s') => KeyAction::Export,
        _ => KeyAction::Ignore,
    }
}

/// Answer at the stop popup, or `None` for keys that are not an answer.
pub fn prompt_answer(key: &KeyEvent) -> Option<Decision> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('y' | 'Y') => Some(Decision::Stop),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Decision::Stop)
        }
        KeyCode::Modifier(_) => None,
        _ => Some(Decision::Continue),
    }
}

// ---------------------------------------------------------------------------
// TuiFrontend
// ---------------------------------------------------------------------------

pub struct TuiFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: TuiState,
    restored: bool,
}

impl TuiFrontend {
    /// Switch to the alternate screen in raw mode. The terminal is restored
    /// by [`TuiFrontend::leave`], on drop, or by the panic hook.
    pub fn enter(theme: Theme) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        Ok(Self {
            terminal,
            state: TuiState {
                theme,
                ..Default::default()
            },
            restored: false,
        })
    }

    pub fn leave(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )
    }

    fn redraw(&mut self) -> io::Result<()> {
        let state = &self.state;
        self.terminal.draw(|f| super::ui::draw(f, state))?;
        Ok(())
    }

    fn export(&mut self) {
        let Some(snapshot) = &self.state.snapshot else {
            return;
        };
        self.state.notice = Some(match snapshot.export(std::path::Path::new(".")) {
            Ok(path) => {
                log::info!("snapshot written to {}", path.display());
                format!("snapshot saved to {}", path.display())
            }
            Err(e) => {
                log::warn!("snapshot export failed: {e}");
                format!("snapshot failed: {e}")
            }
        });
    }
}

impl Drop for TuiFrontend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Frontend for TuiFrontend {
    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        self.state.snapshot = Some(Snapshot::from_view(view));
        self.redraw()
    }

    fn wait(&mut self, interval: Duration, interrupt: &Interrupt) -> io::Result<()> {
        let deadline = wait_deadline(interval);
        while !interrupt.is_raised() {
            let Some(tick) = next_tick(deadline) else {
                break;
            };
            if !event::poll(tick)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => match key_action(&key) {
                    KeyAction::Interrupt => interrupt.trigger(),
                    KeyAction::Export => {
                        self.export();
                        self.redraw()?;
                    }
                    KeyAction::Ignore => {}
                },
                Event::Resize(..) => self.redraw()?,
                _ => {}
            }
        }
        Ok(())
    }

    fn confirm_stop(&mut self) -> io::Result<Decision> {
        self.state.prompting = true;
        self.redraw()?;
        let decision = loop {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(d) = prompt_answer(&key) {
                        break d;
                    }
                }
                Event::Resize(..) => self.redraw()?,
                _ => {}
            }
        };
        self.state.prompting = false;
        if decision == Decision::Continue {
            self.redraw()?;
        }
        Ok(decision)
    }
}
