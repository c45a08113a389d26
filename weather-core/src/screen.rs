//! State holder behind the weather screen.
//!
//! The controller owns the one [`RequestState`] value the view renders and
//! publishes every transition through a `tokio::sync::watch` channel.

use log::{debug, info};
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    Config, ErrorKind, IconSize, RequestState, Units, ValidationNotice, WeatherProvider,
    WeatherQuery, WeatherResult, display::WeatherView, provider::provider_from_config,
};

#[derive(Debug)]
pub struct ScreenController {
    provider: Arc<dyn WeatherProvider>,
    api_key: String,
    units: Units,
    icon_size: IconSize,
    shared: Arc<Shared>,
    /// Written under the state channel's lock, together with the generation bump.
    last_city: Mutex<Option<String>>,
}

#[derive(Debug)]
struct Shared {
    state: watch::Sender<RequestState>,
    /// Number of the most recent submission. Only its completion may land.
    generation: AtomicU64,
}

impl Shared {
    fn complete(&self, generation: u64, outcome: &Result<WeatherResult, ErrorKind>) {
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = match outcome {
                Ok(result) => RequestState::Success(result.clone()),
                Err(err) => RequestState::Failed(err.clone()),
            };
            true
        });

        if !applied {
            debug!("Discarding stale result of submission #{generation}");
        }
    }
}

/// Handle to one in-flight lookup.
#[derive(Debug)]
pub struct Submission {
    city: String,
    sequence: u64,
    handle: JoinHandle<Result<WeatherResult, ErrorKind>>,
}

impl Submission {
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Position of this submission among all submissions of its controller.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Wait for this submission's own result.
    ///
    /// The screen state may show a different value if a newer submission
    /// was made in the meantime.
    pub async fn outcome(self) -> Result<WeatherResult, ErrorKind> {
        self.handle.await.unwrap_or_else(|e| {
            Err(ErrorKind::Unknown(format!("Weather request task failed: {e}")))
        })
    }
}

impl ScreenController {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        api_key: impl Into<String>,
        units: Units,
        icon_size: IconSize,
    ) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);

        Self {
            provider,
            api_key: api_key.into(),
            units,
            icon_size,
            shared: Arc::new(Shared { state, generation: AtomicU64::new(0) }),
            last_city: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(provider_from_config(config), api_key, config.units, config.icon_size))
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn icon_size(&self) -> IconSize {
        self.icon_size
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.shared.state.subscribe()
    }

    /// Look up the weather for `raw_input`.
    ///
    /// Blank input is rejected without touching the state. Otherwise the
    /// state becomes `Loading` immediately and the request runs on the tokio
    /// runtime, so this must be called from within one.
    pub fn submit(&self, raw_input: &str) -> Result<Submission, ValidationNotice> {
        let query = WeatherQuery::new(raw_input, self.units, self.api_key.as_str())
            .inspect_err(|notice| info!("Ignoring submission: {notice}"))?;

        let city = query.city().to_string();

        let mut generation = 0;
        self.shared.state.send_modify(|state| {
            generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *self.last_city.lock().unwrap_or_else(PoisonError::into_inner) = Some(city.clone());
            *state = RequestState::Loading;
        });
        debug!("Submission #{generation} for '{city}'");

        let provider = Arc::clone(&self.provider);
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            // A panicking provider still has to move the state out of `Loading`.
            let fetch = tokio::spawn(async move { provider.fetch(&query).await });
            let outcome = fetch.await.unwrap_or_else(|e| {
                Err(ErrorKind::Unknown(format!("Weather request task failed: {e}")))
            });
            shared.complete(generation, &outcome);
            outcome
        });

        Ok(Submission { city, sequence: generation, handle })
    }

    /// Resubmit the last city. Only does something while the state is `Failed`.
    pub fn retry(&self) -> Option<Submission> {
        let city = {
            let state = self.shared.state.borrow();
            if !matches!(*state, RequestState::Failed(_)) {
                return None;
            }
            self.last_city.lock().unwrap_or_else(PoisonError::into_inner).clone()?
        };
        self.submit(&city).ok()
    }

    /// Clear a displayed error.
    pub fn dismiss(&self) {
        self.shared.state.send_if_modified(|state| {
            if matches!(state, RequestState::Failed(_)) {
                *state = RequestState::Idle;
                true
            } else {
                false
            }
        });
    }

    /// Display fields of the current result, if there is one.
    pub fn view(&self) -> Option<WeatherView> {
        self.shared
            .state
            .borrow()
            .result()
            .map(|result| WeatherView::from_result(result, self.units, self.icon_size))
    }
}
