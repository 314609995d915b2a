use std::io::{self, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use clap::Subcommand;
use flipclock_core::alarm::BeepPattern;
use flipclock_core::storage::KvBackend;
use flipclock_core::timer::{IntervalDriver, SystemClock};
use flipclock_core::{
    AlarmService, Event, KvStore, LocaleService, SharedSettings, TimerEngine, TimerState,
    ToneSink,
};

use super::open_settings;

const STATE_KEY: &str = "timerState";
const BAR_WIDTH: usize = 24;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Count down the current interval in the foreground
    Run,
    /// Back to an idle Work interval
    Reset,
    /// Change the current duration by DELTA minutes
    Adjust {
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
    /// Set the current duration, in minutes
    Set {
        /// Typed minutes; anything unparsable counts as 1
        minutes: String,
    },
    /// Rename the current phase; an empty label restores the default
    Label {
        #[arg(default_value = "")]
        text: String,
    },
}

/// Rings the terminal bell once per beep.
///
/// The spaced sequence runs on its own thread so the countdown loop never
/// sleeps. Dropping the bell waits for a sequence still in progress.
struct TerminalBell<W: Write + Send + 'static> {
    out: Arc<Mutex<W>>,
    cancelled: Arc<AtomicBool>,
    ringing: Option<JoinHandle<()>>,
}

impl TerminalBell<io::Stderr> {
    fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send + 'static> TerminalBell<W> {
    fn new(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            cancelled: Arc::new(AtomicBool::new(false)),
            ringing: None,
        }
    }

    fn wait(&mut self) {
        if let Some(handle) = self.ringing.take() {
            if handle.join().is_err() {
                tracing::warn!("bell thread panicked");
            }
        }
    }
}

impl<W: Write + Send + 'static> ToneSink for TerminalBell<W> {
    fn play(&mut self, pattern: &BeepPattern) -> io::Result<()> {
        self.wait();
        self.cancelled.store(false, Ordering::SeqCst);

        let out = Arc::clone(&self.out);
        let cancelled = Arc::clone(&self.cancelled);
        let count = pattern.count;
        let spacing = Duration::from_millis(u64::from(pattern.spacing_ms));
        let handle = thread::Builder::new()
            .name("bell".into())
            .spawn(move || {
                for n in 0..count {
                    if n > 0 {
                        thread::sleep(spacing);
                    }
                    if cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    let Ok(mut sink) = out.lock() else { return };
                    if let Err(e) = sink.write_all(b"\x07").and_then(|()| sink.flush()) {
                        tracing::debug!(error = %e, "bell write failed");
                        return;
                    }
                }
            })?;
        self.ringing = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl<W: Write + Send + 'static> Drop for TerminalBell<W> {
    fn drop(&mut self) {
        self.wait();
    }
}

/// Engine restored from the last invocation.
///
/// Only a paused countdown is restored as-is. An idle interval keeps its
/// phase but picks up the configured duration, which may have changed
/// through `config set` in the meantime.
fn load_engine(settings: &SharedSettings, kv: &KvStore) -> TimerEngine {
    let locale = Rc::new(LocaleService::new(settings.clone()));
    let alarm = AlarmService::with_sink(settings.clone(), TerminalBell::stderr());
    let mut engine =
        TimerEngine::new(settings.clone(), locale, IntervalDriver::every_second(SystemClock::new()))
            .with_alarm(alarm);

    let saved = match kv.get(STATE_KEY) {
        Ok(Some(json)) => serde_json::from_str::<TimerState>(&json).ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read timer state");
            None
        }
    };
    if let Some(mut state) = saved {
        if state.running {
            // A countdown never survives the process; it comes back paused.
            state.paused = true;
        } else {
            let minutes = settings.borrow().settings().duration_min(state.phase);
            state = TimerState::idle(state.phase, minutes);
        }
        engine.restore(state);
    }
    engine
}

fn save_engine(kv: &KvStore, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(&engine.state())?;
    kv.set(STATE_KEY, &json)?;
    Ok(())
}

fn print_event(event: Option<Event>, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let event = event.unwrap_or_else(|| engine.snapshot());
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = open_settings()?;
    let kv = KvStore::open()?;
    let mut engine = load_engine(&settings, &kv);

    match action {
        TimerAction::Status => print_event(None, &engine)?,
        TimerAction::Run => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_foreground(&mut engine))?;
        }
        TimerAction::Reset => {
            let event = engine.reset();
            print_event(event, &engine)?;
        }
        TimerAction::Adjust { delta } => {
            let event = engine
                .adjust(delta)
                .ok_or("timer is paused; reset it before changing the duration")?;
            print_event(Some(event), &engine)?;
        }
        TimerAction::Set { minutes } => {
            engine
                .begin_edit()
                .ok_or("timer is paused; reset it before changing the duration")?;
            let event = engine.commit_edit(&minutes);
            print_event(event, &engine)?;
        }
        TimerAction::Label { text } => {
            engine.begin_label_edit();
            let event = engine.commit_label_edit(&text);
            print_event(event, &engine)?;
        }
    }

    save_engine(&kv, &engine)?;
    Ok(())
}

/// Terminal display adapter: one status line redrawn on every tick.
async fn run_foreground(engine: &mut TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    engine.start();
    draw(&mut stdout, engine)?;

    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = engine.pump();
                if events.is_empty() {
                    continue;
                }
                let completed = events.iter().find_map(|e| match e {
                    Event::IntervalCompleted { completed, .. } => Some(*completed),
                    _ => None,
                });
                if let Some(completed) = completed {
                    writeln!(stdout)?;
                    println!(
                        "{completed:?} finished. Next: {} {}",
                        engine.label(),
                        engine.state().display()
                    );
                    return Ok(());
                }
                draw(&mut stdout, engine)?;
            }
            _ = &mut ctrl_c => {
                engine.pause();
                draw(&mut stdout, engine)?;
                writeln!(stdout)?;
                return Ok(());
            }
        }
    }
}

fn draw(out: &mut impl Write, engine: &TimerEngine) -> io::Result<()> {
    let view = engine.view();
    let filled = ((view.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let bar = "#".repeat(filled) + &"-".repeat(BAR_WIDTH - filled);
    write!(
        out,
        "\r\x1b[2K{}  {}  [{bar}] {:>3.0}%  ({:?})",
        view.label,
        view.display,
        view.progress * 100.0,
        view.status
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipclock_core::alarm::ALARM_PATTERN;
    use std::time::Instant;

    #[test]
    fn bell_play_returns_before_sequence_ends() {
        let mut bell = TerminalBell::new(Vec::new());
        let out = Arc::clone(&bell.out);

        let started = Instant::now();
        bell.play(&ALARM_PATTERN).unwrap();
        let spacing = u64::from(ALARM_PATTERN.spacing_ms);
        assert!(started.elapsed() < Duration::from_millis(spacing));

        drop(bell);
        let rung = out.lock().unwrap();
        assert_eq!(rung.len(), ALARM_PATTERN.count as usize);
        assert!(rung.iter().all(|&b| b == 0x07));
    }

    #[test]
    fn bell_stop_cuts_sequence_short() {
        let mut bell = TerminalBell::new(Vec::new());
        let out = Arc::clone(&bell.out);
        bell.play(&ALARM_PATTERN).unwrap();
        bell.stop();
        drop(bell);
        assert!(out.lock().unwrap().len() < ALARM_PATTERN.count as usize);
    }
}
