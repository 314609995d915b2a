use std::io::Write;
use std::time::Duration;

use chrono::Local;
use clap::{Args, ValueEnum};
use flipclock_core::clock::DigitGroup;
use flipclock_core::{ClockFace, ClockZoom, EmbedOptions, FlipClock, LocaleService};

use super::open_settings;

#[derive(Args)]
pub struct ClockArgs {
    /// Embed query string, e.g. "ampm=1&showseconds=0"
    #[arg(long)]
    query: Option<String>,
    /// Keep rendering once per second until Ctrl-C
    #[arg(long)]
    watch: bool,
    /// Enlarge one digit pair
    #[arg(long, value_enum)]
    zoom: Option<ZoomTarget>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ZoomTarget {
    Hour,
    Minute,
    Second,
}

impl From<ZoomTarget> for DigitGroup {
    fn from(target: ZoomTarget) -> Self {
        match target {
            ZoomTarget::Hour => DigitGroup::Hour,
            ZoomTarget::Minute => DigitGroup::Minute,
            ZoomTarget::Second => DigitGroup::Second,
        }
    }
}

struct ClockView {
    options: EmbedOptions,
    locale: LocaleService,
    flip: FlipClock,
    zoom: ClockZoom,
}

impl ClockView {
    /// Render the current time, or `None` when no card flipped.
    fn frame(&mut self) -> Option<String> {
        let now = Local::now();
        let face = ClockFace::at(&now, self.options.time_format);
        if self.flip.update(face).is_empty() {
            return None;
        }
        self.zoom.refresh(&face);

        let mut out = face.render(self.options.show_seconds);
        if self.options.show_date {
            out.push_str("  ");
            out.push_str(&self.locale.format_date(now.date_naive()));
        }
        if let Some(label) = self.zoom.label(&self.locale.code()) {
            let (a, b) = self.zoom.digits();
            out.push_str(&format!("  [{a}{b} {label}]"));
        }
        Some(out)
    }
}

pub fn run(args: ClockArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = open_settings()?;
    let options = match &args.query {
        Some(query) => EmbedOptions::from_query(query),
        None => EmbedOptions {
            time_format: settings.borrow().settings().time_format,
            ..EmbedOptions::default()
        },
    };
    tracing::debug!(?options, "clock options");

    let mut view = ClockView {
        options,
        locale: LocaleService::new(settings),
        flip: FlipClock::new(),
        zoom: ClockZoom::new(),
    };
    if let Some(target) = args.zoom {
        let face = ClockFace::at(&Local::now(), options.time_format);
        view.zoom.show(target.into(), &face);
    }

    if !args.watch {
        if let Some(frame) = view.frame() {
            println!("{frame}");
        }
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(view))
}

async fn watch(mut view: ClockView) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(frame) = view.frame() {
                    write!(stdout, "\r\x1b[2K{frame}")?;
                    stdout.flush()?;
                }
            }
            _ = &mut ctrl_c => {
                writeln!(stdout)?;
                return Ok(());
            }
        }
    }
}
