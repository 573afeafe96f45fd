//! Sequencing of one user-initiated lookup: input → fetch → render.
//!
//! A lookup moves `Idle → Loading → Success | Failed`. Overlapping lookups are
//! neither cancelled nor queued; whichever settles last owns the panels.

use tracing::{debug, info, warn};

use crate::{
    error::LookupError,
    geolocation::Geolocator,
    model::CurrentConditions,
    prefs::{PreferenceStore, SearchHistory, Theme},
    provider::WeatherProvider,
    view::Presenter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

#[derive(Debug)]
pub struct Controller<P: Presenter> {
    provider: Box<dyn WeatherProvider>,
    geolocator: Box<dyn Geolocator>,
    prefs: PreferenceStore,
    presenter: P,
    history: SearchHistory,
    theme: Theme,
    state: LookupState,
}

impl<P: Presenter> Controller<P> {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        geolocator: Box<dyn Geolocator>,
        prefs: PreferenceStore,
        presenter: P,
    ) -> Self {
        Self {
            provider,
            geolocator,
            prefs,
            presenter,
            history: SearchHistory::new(),
            theme: Theme::default(),
            state: LookupState::Idle,
        }
    }

    /// Load persisted preferences and paint them.
    pub fn init(&mut self) {
        self.theme = self.prefs.load_theme();
        self.presenter.apply_theme(self.theme);
        self.presenter.render_theme_control(self.theme);

        self.history = self.prefs.load_history();
        self.presenter.render_history(self.history.entries());
    }

    pub fn state(&self) -> LookupState {
        self.state
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Look up `city` as typed in the search form.
    pub async fn submit(&mut self, city: &str) -> LookupState {
        let city = city.trim();
        if city.is_empty() {
            return self.fail(LookupError::EmptyCity.user_message());
        }

        self.begin_lookup();
        let result = self.provider.fetch_current_by_name(city).await;
        self.presenter.hide_loading();

        match result {
            Ok(current) => self.complete(&current, city).await,
            Err(err) => self.fail_lookup(err),
        }
    }

    /// A history entry was picked; behaves like submitting it.
    pub async fn select_history(&mut self, city: &str) -> LookupState {
        self.submit(city).await
    }

    /// Look up the weather wherever the geolocator says we are.
    pub async fn use_location(&mut self) -> LookupState {
        let coords = match self.geolocator.locate().await {
            Ok(coords) => coords,
            Err(err) => {
                info!(error = %err, "geolocation failed");
                return self.fail(err.user_message());
            }
        };

        self.begin_lookup();
        let result = self.provider.fetch_current_by_coords(coords).await;
        self.presenter.hide_loading();

        match result {
            Ok(current) => {
                // The payload names the place; we only had coordinates.
                let city = current.city.clone();
                self.complete(&current, &city).await
            }
            Err(err) => self.fail_lookup(err),
        }
    }

    /// Flip light/dark, persist, repaint. Independent of any lookup.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(err) = self.prefs.save_theme(self.theme) {
            warn!(error = %err, "failed to persist theme");
        }
        self.presenter.apply_theme(self.theme);
        self.presenter.render_theme_control(self.theme);
        self.theme
    }

    fn begin_lookup(&mut self) {
        self.state = LookupState::Loading;
        self.presenter.clear_panels();
        self.presenter.show_loading();
    }

    async fn complete(&mut self, current: &CurrentConditions, city: &str) -> LookupState {
        self.presenter.show_current_conditions(current);
        self.state = LookupState::Success;

        if city.is_empty() {
            debug!("provider returned no place name; skipping history and forecast");
            return self.state;
        }

        self.history.record(city);
        if let Err(err) = self.prefs.save_history(&self.history) {
            warn!(error = %err, "failed to persist search history");
        }
        self.presenter.render_history(self.history.entries());

        // Forecast is decoration: failures leave the panel hidden.
        match self.provider.fetch_forecast_by_name(city).await {
            Ok(days) => self.presenter.show_forecast(&days),
            Err(err) => debug!(error = %err, city, "forecast unavailable"),
        }

        self.state
    }

    fn fail_lookup(&mut self, err: LookupError) -> LookupState {
        info!(error = %err, "weather lookup failed");
        self.fail(err.user_message())
    }

    fn fail(&mut self, message: &str) -> LookupState {
        self.presenter.show_error(message);
        self.state = LookupState::Failed;
        self.state
    }
}
