//! Presentation contract and the panel state it drives.
//!
//! The controller talks to a [`Presenter`]; [`Panels`] is the plain state
//! holder behind it (what is visible right now), which front ends draw.

use std::time::{Duration, Instant};

use crate::{
    model::{CurrentConditions, ForecastDay},
    prefs::Theme,
};

/// How long an error stays on screen.
pub const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

pub trait Presenter {
    fn show_loading(&mut self);
    fn hide_loading(&mut self);

    /// Hide current conditions, forecast and any error before a new lookup.
    fn clear_panels(&mut self);

    fn show_current_conditions(&mut self, current: &CurrentConditions);

    /// An empty slice leaves the forecast panel hidden.
    fn show_forecast(&mut self, days: &[ForecastDay]);

    /// Shown for [`ERROR_DISPLAY_DURATION`], then hidden.
    fn show_error(&mut self, message: &str);

    /// Entries are selectable; a selection goes back to
    /// [`Controller::select_history`](crate::controller::Controller::select_history).
    fn render_history(&mut self, entries: &[String]);

    /// The control label names the theme it switches to, see [`Theme::control_label`].
    fn render_theme_control(&mut self, current: Theme);

    fn apply_theme(&mut self, theme: Theme);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBanner {
    pub message: String,
    pub shown_at: Instant,
}

impl ErrorBanner {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= ERROR_DISPLAY_DURATION
    }
}

/// Everything currently on screen.
#[derive(Debug, Clone, Default)]
pub struct Panels {
    pub loading: bool,
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<ForecastDay>,
    pub error: Option<ErrorBanner>,
    pub history: Vec<String>,
    pub theme: Theme,
    pub theme_control_label: String,
}

impl Panels {
    pub fn new() -> Self {
        Self::default()
    }

    /// The error message, unless its display time has run out.
    pub fn visible_error(&self, now: Instant) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|banner| !banner.is_expired(now))
            .map(|banner| banner.message.as_str())
    }

    /// Drop an expired banner so later draws skip it.
    pub fn expire_error(&mut self, now: Instant) {
        if self.error.as_ref().is_some_and(|banner| banner.is_expired(now)) {
            self.error = None;
        }
    }

    pub fn forecast_visible(&self) -> bool {
        !self.forecast.is_empty()
    }
}

impl Presenter for Panels {
    fn show_loading(&mut self) {
        self.loading = true;
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn clear_panels(&mut self) {
        self.current = None;
        self.forecast.clear();
        self.error = None;
    }

    fn show_current_conditions(&mut self, current: &CurrentConditions) {
        self.current = Some(current.clone());
    }

    fn show_forecast(&mut self, days: &[ForecastDay]) {
        self.forecast = days.to_vec();
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(ErrorBanner { message: message.to_string(), shown_at: Instant::now() });
    }

    fn render_history(&mut self, entries: &[String]) {
        self.history = entries.to_vec();
    }

    fn render_theme_control(&mut self, current: Theme) {
        self.theme_control_label = current.control_label().to_string();
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}
