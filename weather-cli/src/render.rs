use std::io::Write;

use weather_core::{
    Bitmap, Renderer, WeatherSnapshot,
    format::{self, DAILY_SHOWN, HOURLY_SHOWN},
};

/// Prints snapshots as plain text blocks.
pub struct TerminalRenderer<W: Write> {
    out: W,
    print_errors: bool,
    last_error: Option<String>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            print_errors: true,
            last_error: None,
        }
    }

    /// Keep errors for [`take_error`](Self::take_error) without printing them.
    pub fn deferring_errors(mut self) -> Self {
        self.print_errors = false;
        self
    }

    /// Take the error reported since the last call, if any.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    fn write_snapshot(&mut self, snapshot: &WeatherSnapshot) -> std::io::Result<()> {
        let units = snapshot.query.units;
        let out = &mut self.out;

        writeln!(out, "== Current Weather ==")?;
        for line in format::current_lines(&snapshot.current, units) {
            writeln!(out, "{line}")?;
        }

        writeln!(out)?;
        writeln!(out, "== Hourly (Next 24 hours) ==")?;
        let hourly = snapshot.forecast.hourly.iter().take(HOURLY_SHOWN);
        for (i, entry) in hourly.enumerate() {
            let icon = icon_tag(&entry.icon, snapshot.hourly_icons.get(i));
            writeln!(out, "{}  {icon}", format::hourly_cell(entry, units))?;
        }

        writeln!(out)?;
        writeln!(out, "== Daily (Next 5 days) ==")?;
        let daily = snapshot.forecast.daily.iter().take(DAILY_SHOWN);
        for (i, entry) in daily.enumerate() {
            let icon = icon_tag(&entry.icon, snapshot.daily_icons.get(i));
            writeln!(out, "{}  {icon}", format::daily_cell(entry, units))?;
        }

        out.flush()
    }
}

/// `[code]` when the icon loaded (or was never requested), `[Icon]` when it failed.
fn icon_tag(code: &str, bitmap: Option<&Option<Bitmap>>) -> String {
    match bitmap {
        Some(None) => "[Icon]".to_string(),
        _ => format!("[{code}]"),
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, snapshot: &WeatherSnapshot) {
        if let Err(err) = self.write_snapshot(snapshot) {
            tracing::warn!("Failed to write weather output: {err}");
        }
    }

    fn show_error(&mut self, message: &str) {
        if self.print_errors {
            if let Err(err) = writeln!(self.out, "Error: {message}") {
                tracing::warn!("Failed to write error message: {err}");
            }
        }
        self.last_error = Some(message.to_string());
    }
}
