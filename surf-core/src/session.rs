use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::{
    Config, SearchSettings,
    client::{LocationSearch, MarineDetail},
    debounce::Debouncer,
    provider::{geocoding_from_config, marine_from_config},
    render::{DetailPane, SearchArea},
    store::{Action, Effect, Store, ViewState},
};

/// Owns the store and runs the effects it asks for.
///
/// Timers and requests run as tokio tasks and report back through a channel;
/// actions are applied one at a time by whoever drives the session.
#[derive(Debug)]
pub struct Session {
    store: Store,
    search: LocationSearch,
    marine: MarineDetail,
    debouncer: Debouncer,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
}

impl Session {
    pub fn new(search: LocationSearch, marine: MarineDetail, settings: SearchSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store: Store::new(settings),
            search,
            marine,
            debouncer: Debouncer::new(settings.debounce),
            tx,
            rx,
        }
    }

    /// Session backed by the Open-Meteo services named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let settings = config.search_settings();
        Self::new(
            LocationSearch::new(geocoding_from_config(config), settings.min_query_len),
            MarineDetail::new(marine_from_config(config)),
            settings,
        )
    }

    pub fn state(&self) -> &ViewState {
        self.store.state()
    }

    pub fn search_area(&self) -> SearchArea<'_> {
        SearchArea::from_state(&self.state().search, self.store.settings().min_query_len)
    }

    pub fn detail_pane(&self) -> DetailPane<'_> {
        DetailPane::from_state(&self.state().detail)
    }

    pub fn is_idle(&self) -> bool {
        self.store.is_idle()
    }

    /// Apply `action` and start whatever work it requires. Must be called
    /// from within a tokio runtime.
    pub fn dispatch(&mut self, action: Action) {
        debug!(?action, "dispatch");
        for effect in self.store.dispatch(action) {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleDebounce { ticket, query } => {
                self.debouncer.schedule(&self.tx, Action::DebounceElapsed { ticket, query });
            }
            Effect::CancelDebounce => self.debouncer.cancel(),
            Effect::FetchLocations { ticket, query } => {
                let search = self.search.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let candidates = search.search(&query).await;
                    let _ = tx.send(Action::SearchResolved { ticket, candidates });
                });
            }
            Effect::FetchMarine { ticket, location } => {
                let marine = self.marine.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = marine.fetch(&location).await;
                    let _ = tx.send(Action::MarineResolved { ticket, outcome });
                });
            }
        }
    }

    /// Wait for the next timer or response and apply it.
    pub async fn process_next(&mut self) {
        // The session holds a sender, so the channel never closes.
        if let Some(action) = self.rx.recv().await {
            self.dispatch(action);
        }
    }

    /// Apply incoming actions until no timer or current request remains.
    /// Responses to superseded requests may still arrive afterwards.
    pub async fn run_until_idle(&mut self) {
        while !self.store.is_idle() {
            self.process_next().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        FetchError, GeocodingProvider, Location, MarineProvider, MarineReading, Measurement,
        render::{MARINE_FAILED, NO_RESULTS},
        store::DetailState,
    };
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
        time::Duration,
    };

    fn location(name: &str, latitude: f64, longitude: f64) -> Location {
        Location { name: name.into(), country: "US".into(), latitude, longitude }
    }

    /// Answers from a fixed table, optionally after a per-query delay.
    #[derive(Debug, Default)]
    struct CannedGeocoder {
        answers: HashMap<String, Vec<Location>>,
        delays: HashMap<String, Duration>,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl CannedGeocoder {
        fn answer(mut self, query: &str, results: Vec<Location>) -> Self {
            self.answers.insert(query.into(), results);
            self
        }

        fn delay(mut self, query: &str, delay: Duration) -> Self {
            self.delays.insert(query.into(), delay);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GeocodingProvider for CannedGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<Location>, FetchError> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail {
                let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
                return Err(FetchError::Parse { service: "test", source });
            }
            Ok(self.answers.get(query).cloned().unwrap_or_default())
        }
    }

    /// Wave height equals latitude / 10; latitude above 80 fails.
    #[derive(Debug, Default)]
    struct CannedMarine {
        delays: Vec<(f64, Duration)>,
        missing_temperature: bool,
        calls: Mutex<Vec<(f64, f64)>>,
    }

    impl CannedMarine {
        fn calls(&self) -> Vec<(f64, f64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MarineProvider for CannedMarine {
        async fn current_conditions(
            &self,
            latitude: f64,
            longitude: f64,
        ) -> Result<MarineReading, FetchError> {
            self.calls.lock().unwrap().push((latitude, longitude));
            if let Some((_, delay)) = self.delays.iter().find(|(lat, _)| *lat == latitude) {
                tokio::time::sleep(*delay).await;
            }
            if latitude > 80.0 {
                let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                return Err(FetchError::Parse { service: "test", source });
            }
            let sea_surface_temperature = if self.missing_temperature {
                Measurement::Absent
            } else {
                Measurement::Present { value: 17.5, unit: "°C".into() }
            };
            Ok(MarineReading {
                wave_height: Measurement::Present { value: latitude / 10.0, unit: "m".into() },
                sea_surface_temperature,
                observation_time: NaiveDateTime::default(),
            })
        }
    }

    fn session(geocoder: &Arc<CannedGeocoder>, marine: &Arc<CannedMarine>) -> Session {
        let settings = SearchSettings::default();
        Session::new(
            LocationSearch::new(geocoder.clone(), settings.min_query_len),
            MarineDetail::new(marine.clone()),
            settings,
        )
    }

    async fn type_text(session: &mut Session, text: &str) {
        let mut typed = String::new();
        for ch in text.chars() {
            typed.push(ch);
            session.dispatch(Action::QueryChanged(typed.clone()));
            tokio::time::advance(Duration::from_millis(50)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_one_request() {
        let geocoder = Arc::new(CannedGeocoder::default());
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        type_text(&mut session, "wave").await;
        session.run_until_idle().await;

        assert_eq!(geocoder.calls(), vec!["wave".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_longer_than_debounce_search_each_value() {
        let geocoder = Arc::new(CannedGeocoder::default());
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        session.dispatch(Action::QueryChanged("Sur".into()));
        session.run_until_idle().await;
        session.dispatch(Action::QueryChanged("Surf".into()));
        session.run_until_idle().await;

        assert_eq!(geocoder.calls(), vec!["Sur".to_string(), "Surf".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_issues_no_request() {
        let geocoder = Arc::new(CannedGeocoder::default());
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        type_text(&mut session, "sa").await;
        session.run_until_idle().await;

        assert!(geocoder.calls().is_empty());
        assert!(session.state().search.candidates.is_empty());
        assert!(session.search_area().to_string().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn canned_results_render_in_order() {
        let geocoder = Arc::new(CannedGeocoder::default().answer(
            "San",
            vec![location("San Diego", 32.72, -117.16), location("San Jose", 37.34, -121.89)],
        ));
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        session.dispatch(Action::QueryChanged("San".into()));
        session.run_until_idle().await;

        let text = session.search_area().to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["San Diego, US  32.72°, -117.16°", "San Jose, US  37.34°, -121.89°"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_response_renders_no_results() {
        let geocoder = Arc::new(CannedGeocoder::default());
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        session.dispatch(Action::QueryChanged("Xyzzy".into()));
        session.run_until_idle().await;

        assert_eq!(session.search_area().to_string().trim(), NO_RESULTS);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_search_renders_no_results() {
        let geocoder = Arc::new(CannedGeocoder {
            fail: true,
            ..CannedGeocoder::default().answer("Biarritz", vec![location("Biarritz", 43.48, -1.56)])
        });
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        session.dispatch(Action::QueryChanged("Biarritz".into()));
        session.run_until_idle().await;

        assert_eq!(geocoder.calls(), vec!["Biarritz".to_string()]);
        assert!(!session.state().search.loading);
        assert!(session.state().search.candidates.is_empty());
        assert_eq!(session.search_area().to_string().trim(), NO_RESULTS);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_input_is_synchronous() {
        let geocoder = Arc::new(
            CannedGeocoder::default().answer("Biarritz", vec![location("Biarritz", 43.48, -1.56)]),
        );
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        session.dispatch(Action::QueryChanged("Biarritz".into()));
        session.run_until_idle().await;
        assert_eq!(session.state().search.candidates.len(), 1);

        session.dispatch(Action::QueryChanged(String::new()));

        assert!(session.state().search.candidates.is_empty());
        assert!(session.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn late_search_response_does_not_overwrite_newer_query() {
        let geocoder = Arc::new(
            CannedGeocoder::default()
                .answer("Lisbon", vec![location("Lisbon", 38.72, -9.14)])
                .delay("Lisbon", Duration::from_secs(2))
                .answer("Porto", vec![location("Porto", 41.15, -8.61)])
                .delay("Porto", Duration::from_millis(10)),
        );
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        session.dispatch(Action::QueryChanged("Lisbon".into()));
        // Timer fires and the slow Lisbon request starts.
        session.process_next().await;
        assert!(session.state().search.loading);

        session.dispatch(Action::QueryChanged("Porto".into()));
        session.run_until_idle().await;
        assert_eq!(session.state().search.candidates[0].name, "Porto");

        // The Lisbon answer finally arrives and is dropped.
        session.process_next().await;

        assert_eq!(geocoder.calls(), vec!["Lisbon".to_string(), "Porto".to_string()]);
        assert_eq!(session.state().search.query, "Porto");
        assert_eq!(session.state().search.candidates, vec![location("Porto", 41.15, -8.61)]);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_fetches_once_and_clears_previous_reading() {
        let geocoder = Arc::new(CannedGeocoder::default());
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        let first = location("Huntington Beach", 33.66, -118.0);
        let second = location("Santa Cruz", 36.97, -122.03);

        session.dispatch(Action::CandidateSelected(first.clone()));
        session.run_until_idle().await;
        assert!(session.state().detail.reading().is_some());

        session.dispatch(Action::CandidateSelected(second.clone()));
        assert_eq!(session.state().detail, DetailState::Loading { location: second.clone() });
        assert!(session.state().detail.reading().is_none());

        session.run_until_idle().await;

        assert_eq!(marine.calls(), vec![(33.66, -118.0), (36.97, -122.03)]);
        assert_eq!(session.state().detail.selected(), Some(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn late_marine_response_does_not_overwrite_newer_selection() {
        let geocoder = Arc::new(CannedGeocoder::default());
        let marine = Arc::new(CannedMarine {
            delays: vec![(21.66, Duration::from_secs(3)), (33.38, Duration::from_millis(20))],
            ..Default::default()
        });
        let mut session = session(&geocoder, &marine);

        let pipeline = location("Pipeline", 21.66, -158.05);
        let trestles = location("Trestles", 33.38, -117.59);

        session.dispatch(Action::CandidateSelected(pipeline));
        session.dispatch(Action::CandidateSelected(trestles.clone()));
        session.run_until_idle().await;

        session.process_next().await;

        let DetailState::Loaded { location, reading } = &session.state().detail else {
            panic!("expected loaded detail, got {:?}", session.state().detail);
        };
        assert_eq!(*location, trestles);
        let expected = Measurement::Present { value: 33.38 / 10.0, unit: "m".into() };
        assert_eq!(reading.wave_height, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_temperature_renders_field_message() {
        let geocoder = Arc::new(CannedGeocoder::default());
        let marine = Arc::new(CannedMarine { missing_temperature: true, ..Default::default() });
        let mut session = session(&geocoder, &marine);

        session.dispatch(Action::CandidateSelected(location("Rockaway", 12.0, -73.8)));
        session.run_until_idle().await;

        let text = session.detail_pane().to_string();
        assert!(text.contains("Wave Height: 1.2m"));
        assert!(text.contains("Sea surface temperature data not available for this location"));
        assert!(!text.contains(MARINE_FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn marine_failure_renders_single_message() {
        let geocoder = Arc::new(CannedGeocoder::default());
        let marine = Arc::new(CannedMarine::default());
        let mut session = session(&geocoder, &marine);

        session.dispatch(Action::CandidateSelected(location("Svalbard", 81.0, 15.0)));
        session.run_until_idle().await;

        let text = session.detail_pane().to_string();
        assert!(text.contains(MARINE_FAILED));
        assert!(!text.contains("not available"));
    }
}
