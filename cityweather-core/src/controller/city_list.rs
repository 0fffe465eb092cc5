use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::{
    dispatch::{self, Dispatcher, Mailbox},
    error::{ForecastError, StoreError},
    model::{City, CityCandidate},
    provider::ForecastSource,
    store::CityStore,
};

const EVENT_CAPACITY: usize = 64;

/// Change notifications for whoever renders the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityListEvent {
    /// The list was re-read from the store.
    Reloaded,
    /// One city's temperature and sync time changed.
    CityUpdated(i64),
    /// Short-lived message for the user, such as a failed refresh.
    Notice(String),
}

#[derive(Debug, Error)]
pub enum CityListError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("city {0} is not in the list")]
    UnknownCity(i64),
}

impl CityListError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CityListError::Store(e) => e.user_message(),
            CityListError::UnknownCity(_) => "City no longer exists",
        }
    }
}

/// Result of a background forecast fetch for one city.
#[derive(Debug)]
pub struct ForecastCompletion {
    pub city_id: i64,
    /// When the refresh was requested; becomes the city's sync time.
    pub attempted_at: DateTime<Utc>,
    pub outcome: Result<String, ForecastError>,
}

/// Owns the city list and is the only writer to the store.
#[derive(Debug)]
pub struct CityListController<S> {
    store: S,
    cities: Vec<City>,
    forecast: Arc<dyn ForecastSource>,
    dispatcher: Dispatcher<ForecastCompletion>,
    mailbox: Mailbox<ForecastCompletion>,
    events: broadcast::Sender<CityListEvent>,
}

impl<S: CityStore> CityListController<S> {
    /// Create the controller and load the stored list.
    pub fn new(store: S, forecast: Arc<dyn ForecastSource>) -> Result<Self, CityListError> {
        let (dispatcher, mailbox) = dispatch::channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut controller = Self {
            store,
            cities: Vec::new(),
            forecast,
            dispatcher,
            mailbox,
            events,
        };
        controller.load_all()?;
        Ok(controller)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn city(&self, id: i64) -> Option<&City> {
        self.cities.iter().find(|c| c.id == id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CityListEvent> {
        self.events.subscribe()
    }

    /// True while any refresh is outstanding.
    pub fn is_busy(&self) -> bool {
        self.mailbox.pending() > 0
    }

    /// Replace the in-memory list with the store's contents, in store order.
    pub fn load_all(&mut self) -> Result<&[City], CityListError> {
        self.cities = self.store.select_all()?;
        tracing::debug!(count = self.cities.len(), "loaded cities");
        self.notify(CityListEvent::Reloaded);
        Ok(&self.cities)
    }

    pub fn add_city(&mut self, candidate: CityCandidate) -> Result<i64, CityListError> {
        let id = self.store.insert(&candidate)?;
        self.load_all()?;
        Ok(id)
    }

    pub fn delete_city(&mut self, id: i64) -> Result<(), CityListError> {
        self.store.delete(id)?;
        self.load_all()?;
        Ok(())
    }

    pub fn delete_all(&mut self) -> Result<(), CityListError> {
        self.store.delete_all()?;
        self.load_all()?;
        Ok(())
    }

    /// Start a background forecast fetch for one city.
    pub fn refresh(&mut self, id: i64) -> Result<(), CityListError> {
        let city = self.city(id).ok_or(CityListError::UnknownCity(id))?;
        let latitude = city.latitude.clone();
        let longitude = city.longitude.clone();
        let attempted_at = Utc::now();

        tracing::debug!(id, %latitude, %longitude, "dispatching forecast refresh");
        let forecast = Arc::clone(&self.forecast);
        self.mailbox.expect_one();
        self.dispatcher.spawn(async move {
            let outcome = forecast
                .fetch_current_temperature(&latitude, &longitude)
                .await;
            ForecastCompletion {
                city_id: id,
                attempted_at,
                outcome,
            }
        });
        Ok(())
    }

    /// Wait for the next refresh to finish. `None` if nothing is outstanding.
    pub async fn next_completion(&mut self) -> Option<ForecastCompletion> {
        self.mailbox.recv().await
    }

    /// Write a finished refresh into the list and the store.
    ///
    /// Failures are recorded too: the temperature becomes the error's display
    /// text, the sync time is updated and a notice is published.
    pub fn apply_forecast(&mut self, completion: ForecastCompletion) -> Result<(), CityListError> {
        let ForecastCompletion {
            city_id,
            attempted_at,
            outcome,
        } = completion;

        let Some(index) = self.cities.iter().position(|c| c.id == city_id) else {
            tracing::warn!(city_id, "forecast finished for a city that was removed");
            return Ok(());
        };

        let mut updated = self.cities[index].clone();
        updated.last_sync_time = attempted_at;
        let notice = match outcome {
            Ok(temperature) => {
                tracing::info!(city_id, %temperature, "refreshed temperature");
                updated.temperature = temperature;
                None
            }
            Err(e) => {
                tracing::warn!(city_id, error = %e, "forecast refresh failed");
                updated.temperature = e.temperature_text().to_string();
                Some(e.user_message().to_string())
            }
        };

        self.store.update(&updated)?;
        self.cities[index] = updated;

        self.notify(CityListEvent::CityUpdated(city_id));
        if let Some(message) = notice {
            self.notify(CityListEvent::Notice(message));
        }
        Ok(())
    }

    /// Apply every outstanding refresh as it finishes.
    pub async fn settle(&mut self) -> Result<(), CityListError> {
        while let Some(completion) = self.next_completion().await {
            self.apply_forecast(completion)?;
        }
        Ok(())
    }

    fn notify(&self, event: CityListEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
