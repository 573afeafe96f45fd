//! Terminal rendering of the weather panels.

use std::{
    io::{self, Write},
    time::Instant,
};

use nimbus_core::{CurrentConditions, ForecastDay, Panels, Presenter, Theme};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Accent colours per theme.
struct Palette {
    heading: &'static str,
    text: &'static str,
    muted: &'static str,
    error: &'static str,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            heading: "\x1b[34m",
            text: "\x1b[30m",
            muted: "\x1b[90m",
            error: "\x1b[31m",
        },
        Theme::Dark => Palette {
            heading: "\x1b[96m",
            text: "\x1b[97m",
            muted: "\x1b[37m",
            error: "\x1b[91m",
        },
    }
}

/// [`Presenter`] that keeps [`Panels`] and draws them as text.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    panels: Panels,
    clear_screen: bool,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redraw from the top of the screen instead of appending.
    pub fn set_clear_screen(&mut self, clear: bool) {
        self.clear_screen = clear;
    }

    pub fn draw(&mut self, out: &mut impl Write) -> io::Result<()> {
        self.draw_at(out, Instant::now())
    }

    fn draw_at(&mut self, out: &mut impl Write, now: Instant) -> io::Result<()> {
        self.panels.expire_error(now);
        let p = palette(self.panels.theme);

        if self.clear_screen {
            write!(out, "{CLEAR_SCREEN}")?;
        }

        if let Some(message) = self.panels.visible_error(now) {
            writeln!(out, "{}{BOLD}⚠ {message}{RESET}", p.error)?;
            writeln!(out)?;
        }

        if let Some(current) = &self.panels.current {
            write_current(out, &p, current)?;
        }

        if self.panels.forecast_visible() {
            write_forecast(out, &p, &self.panels.forecast)?;
        }

        if !self.panels.history.is_empty() {
            writeln!(out, "{}Recent searches:{RESET} {}", p.muted, self.panels.history.join(", "))?;
        }

        writeln!(out, "{}[{}]{RESET}", p.muted, self.panels.theme_control_label)?;
        out.flush()
    }
}

fn write_current(out: &mut impl Write, p: &Palette, c: &CurrentConditions) -> io::Result<()> {
    writeln!(out, "{}{BOLD}Weather in {}, {}{RESET}", p.heading, c.city, c.country)?;
    writeln!(out, "{}  {}{RESET}", p.text, c.description)?;
    writeln!(out, "{}  {}{RESET}", p.muted, c.icon_url())?;
    writeln!(out, "{}  Temperature: {} °C", p.text, c.temperature_c)?;
    writeln!(out, "  Feels Like:  {} °C", c.feels_like_c)?;
    writeln!(out, "  Humidity:    {}%", c.humidity_pct)?;
    writeln!(out, "  Wind Speed:  {} m/s", c.wind_speed_mps)?;
    writeln!(out, "  Pressure:    {} hPa", c.pressure_hpa)?;
    match c.visibility_km {
        Some(km) => writeln!(out, "  Visibility:  {km:.1} km{RESET}")?,
        None => writeln!(out, "  Visibility:  n/a{RESET}")?,
    }
    writeln!(out)
}

fn write_forecast(out: &mut impl Write, p: &Palette, days: &[ForecastDay]) -> io::Result<()> {
    writeln!(out, "{}{BOLD}📅 5-Day Forecast{RESET}", p.heading)?;
    for day in days {
        writeln!(
            out,
            "{}  {:<4}{:>4}°C  {}{RESET}",
            p.text, day.weekday, day.temperature_c, day.description
        )?;
    }
    writeln!(out)
}

impl Presenter for TerminalPresenter {
    fn show_loading(&mut self) {
        self.panels.show_loading();
        eprint!("⏳ Loading...");
    }

    fn hide_loading(&mut self) {
        if self.panels.loading {
            // Erase the loading line.
            eprint!("\r\x1b[2K");
        }
        self.panels.hide_loading();
    }

    fn clear_panels(&mut self) {
        self.panels.clear_panels();
    }

    fn show_current_conditions(&mut self, current: &CurrentConditions) {
        self.panels.show_current_conditions(current);
    }

    fn show_forecast(&mut self, days: &[ForecastDay]) {
        self.panels.show_forecast(days);
    }

    fn show_error(&mut self, message: &str) {
        self.panels.show_error(message);
    }

    fn render_history(&mut self, entries: &[String]) {
        self.panels.render_history(entries);
    }

    fn render_theme_control(&mut self, current: Theme) {
        self.panels.render_theme_control(current);
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.panels.apply_theme(theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_current() -> CurrentConditions {
        CurrentConditions {
            city: "London".into(),
            country: "GB".into(),
            temperature_c: 21.5,
            feels_like_c: 20,
            humidity_pct: 64,
            wind_speed_mps: 4.1,
            pressure_hpa: 1012,
            visibility_km: Some(10.0),
            description: "Light Rain".into(),
            icon: "10d".into(),
        }
    }

    fn render(presenter: &mut TerminalPresenter, now: Instant) -> String {
        let mut buf = Vec::new();
        presenter.draw_at(&mut buf, now).expect("draw into memory");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn draws_current_conditions_and_forecast() {
        let mut presenter = TerminalPresenter::new();
        presenter.render_theme_control(Theme::Light);
        presenter.show_current_conditions(&sample_current());
        presenter.show_forecast(&[ForecastDay {
            weekday: "Mon".into(),
            temperature_c: 12,
            description: "light rain".into(),
            icon: "10d".into(),
        }]);
        presenter.render_history(&["London".to_string(), "Paris".to_string()]);

        let text = render(&mut presenter, Instant::now());

        assert!(text.contains("Weather in London, GB"));
        assert!(text.contains("Temperature: 21.5 °C"));
        assert!(text.contains("Feels Like:  20 °C"));
        assert!(text.contains("Visibility:  10.0 km"));
        assert!(text.contains("5-Day Forecast"));
        assert!(text.contains("light rain"));
        assert!(text.contains("London, Paris"));
        assert!(text.contains("🌙 Dark Mode"));
    }

    #[test]
    fn empty_forecast_is_not_drawn() {
        let mut presenter = TerminalPresenter::new();
        presenter.show_current_conditions(&sample_current());
        presenter.show_forecast(&[]);

        let text = render(&mut presenter, Instant::now());
        assert!(!text.contains("5-Day Forecast"));
    }

    #[test]
    fn error_disappears_after_display_window() {
        let mut presenter = TerminalPresenter::new();
        presenter.show_error("Please enter a city name");
        let shown_at = presenter.panels.error.as_ref().map(|b| b.shown_at).expect("banner");

        let early = render(&mut presenter, shown_at + Duration::from_secs(1));
        assert!(early.contains("Please enter a city name"));

        let late = render(&mut presenter, shown_at + Duration::from_secs(5));
        assert!(!late.contains("Please enter a city name"));
        assert!(presenter.panels.error.is_none());
    }

    #[test]
    fn clear_screen_prefix_only_when_enabled() {
        let mut presenter = TerminalPresenter::new();
        assert!(!render(&mut presenter, Instant::now()).starts_with(CLEAR_SCREEN));

        presenter.set_clear_screen(true);
        assert!(render(&mut presenter, Instant::now()).starts_with(CLEAR_SCREEN));
    }
}
