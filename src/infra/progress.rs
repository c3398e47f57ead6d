use crate::domain::host::CancellationToken;
use crossterm::{
    ExecutableCommand, cursor,
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{self, Clear, ClearType},
};
use log::{debug, info};
use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Single rewritten terminal line showing expansion progress. While open on a
/// terminal it also listens for Esc, `q` or Ctrl-C and trips the cancellation
/// token when one arrives.
pub struct ConsoleProgress {
    token: CancellationToken,
    enabled: bool,
    title: String,
    start_time: Instant,
    update_interval: Duration,
    last_update: Option<Instant>,
    report_count: usize,
    listening: KeyListening,
}

/// How cancel keys are read while progress is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyListening {
    Off,
    /// Raw mode is already on, held by the browser.
    SharedRawMode,
    /// Raw mode is switched on only for each poll so log lines stay intact.
    PerPoll,
}

pub fn key_listening(stdin_tty: bool, raw_mode_on: bool, drawing: bool) -> KeyListening {
    if !stdin_tty {
        KeyListening::Off
    } else if raw_mode_on {
        KeyListening::SharedRawMode
    } else if drawing {
        KeyListening::PerPoll
    } else {
        KeyListening::Off
    }
}

impl ConsoleProgress {
    pub fn new(token: CancellationToken, enabled: bool) -> Self {
        Self {
            token,
            enabled,
            title: String::new(),
            start_time: Instant::now(),
            update_interval: Duration::from_millis(100),
            last_update: None,
            report_count: 0,
            listening: KeyListening::Off,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn report_count(&self) -> usize {
        self.report_count
    }

    pub fn begin(&mut self, title: &str) -> io::Result<()> {
        self.title = title.to_string();
        self.start_time = Instant::now();
        self.last_update = None;
        self.report_count = 0;
        info!("{}", title);

        let drawing = self.enabled && io::stdout().is_terminal();
        let stdin_tty = io::stdin().is_terminal();
        let raw_mode_on = stdin_tty && terminal::is_raw_mode_enabled()?;
        self.listening = key_listening(stdin_tty, raw_mode_on, drawing);
        debug!("Cancel keys: {:?}", self.listening);

        if !drawing {
            return Ok(());
        }

        let mut stdout = io::stdout();
        write!(stdout, "{} (Esc to cancel)\r\n", title)?;
        stdout.flush()
    }

    pub fn report(&mut self, message: &str, percentage: Option<u8>) -> io::Result<()> {
        self.report_count += 1;
        debug!("Progress: {}", message);
        self.poll_cancel()?;

        if !self.enabled || !io::stdout().is_terminal() {
            return Ok(());
        }

        let now = Instant::now();
        if let Some(last) = self.last_update
            && now.duration_since(last) < self.update_interval
            && percentage.is_none()
        {
            return Ok(());
        }
        self.last_update = Some(now);

        let spinner_idx =
            ((self.start_time.elapsed().as_millis() / 100) % SPINNER_CHARS.len() as u128) as usize;
        let line = format_status_line(SPINNER_CHARS[spinner_idx], message, percentage);
        let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
        let line: String = line.chars().take(width.saturating_sub(1)).collect();

        let mut stdout = io::stdout();
        stdout.execute(cursor::SavePosition)?;
        stdout.execute(Clear(ClearType::CurrentLine))?;
        write!(stdout, "{}", line)?;
        stdout.flush()?;
        stdout.execute(cursor::RestorePosition)?;
        Ok(())
    }

    pub fn finish(&mut self) -> io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        debug!(
            "{} finished after {} updates in {:.1}s",
            self.title, self.report_count, elapsed
        );

        self.listening = KeyListening::Off;

        if !self.enabled || !io::stdout().is_terminal() {
            return Ok(());
        }

        let mut stdout = io::stdout();
        stdout.execute(Clear(ClearType::CurrentLine))?;
        writeln!(
            stdout,
            "✓ {} updates in {:.1}s",
            self.report_count, elapsed
        )?;
        Ok(())
    }

    fn poll_cancel(&self) -> io::Result<()> {
        match self.listening {
            KeyListening::Off => Ok(()),
            KeyListening::SharedRawMode => self.drain_keys(),
            KeyListening::PerPoll => {
                terminal::enable_raw_mode()?;
                let result = self.drain_keys();
                terminal::disable_raw_mode()?;
                result
            }
        }
    }

    fn drain_keys(&self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()?
                && is_cancel_key(key.code, key.modifiers)
            {
                info!("Cancellation requested from the terminal");
                self.token.cancel();
            }
        }
        Ok(())
    }
}

pub fn is_cancel_key(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub fn format_status_line(spinner: char, message: &str, percentage: Option<u8>) -> String {
    match percentage {
        Some(pct) => format!("{} [{:>3}%] {}", spinner, pct, message),
        None => format!("{} {}", spinner, message),
    }
}
