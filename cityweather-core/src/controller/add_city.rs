use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    dispatch::{self, Dispatcher, Mailbox},
    error::{GeocodeError, ValidationError},
    model::{CityCandidate, GeocodeMatch},
    provider::Geocoder,
    validation::validate_city_fields,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddCityState {
    Editing,
    Validating,
    /// A candidate was emitted; the flow is over.
    Resolved,
    /// Cancelled without a candidate; the flow is over.
    Rejected,
}

impl AddCityState {
    pub fn is_finished(&self) -> bool {
        matches!(self, AddCityState::Resolved | AddCityState::Rejected)
    }
}

/// Raw text of the add-city form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityForm {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Error)]
pub enum AddCityError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error("the add-city flow has already finished")]
    Finished,
}

impl AddCityError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AddCityError::Validation(e) => e.user_message(),
            AddCityError::Geocode(e) => e.user_message(),
            AddCityError::Finished => "This form is closed",
        }
    }
}

/// Result of a background geocoding lookup.
#[derive(Debug)]
pub struct AutofillCompletion {
    pub query: String,
    pub outcome: Result<GeocodeMatch, GeocodeError>,
}

/// Collects a new city and emits it as a `CityCandidate`.
#[derive(Debug)]
pub struct AddCityController {
    form: CityForm,
    state: AddCityState,
    geocoder: Arc<dyn Geocoder>,
    dispatcher: Dispatcher<AutofillCompletion>,
    mailbox: Mailbox<AutofillCompletion>,
}

impl AddCityController {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        let (dispatcher, mailbox) = dispatch::channel();
        Self {
            form: CityForm::default(),
            state: AddCityState::Editing,
            geocoder,
            dispatcher,
            mailbox,
        }
    }

    pub fn state(&self) -> AddCityState {
        self.state
    }

    pub fn form(&self) -> &CityForm {
        &self.form
    }

    /// True while a geocoding lookup is in flight.
    pub fn is_busy(&self) -> bool {
        self.mailbox.pending() > 0
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), AddCityError> {
        self.ensure_editing()?;
        self.form.name = name.into();
        Ok(())
    }

    pub fn set_latitude(&mut self, latitude: impl Into<String>) -> Result<(), AddCityError> {
        self.ensure_editing()?;
        self.form.latitude = latitude.into();
        Ok(())
    }

    pub fn set_longitude(&mut self, longitude: impl Into<String>) -> Result<(), AddCityError> {
        self.ensure_editing()?;
        self.form.longitude = longitude.into();
        Ok(())
    }

    /// Start a background lookup of the current name.
    ///
    /// An empty name fails immediately and nothing is dispatched.
    pub fn request_autofill(&mut self) -> Result<(), AddCityError> {
        self.ensure_editing()?;

        let query = self.form.name.trim().to_string();
        if query.is_empty() {
            return Err(GeocodeError::EmptyInput.into());
        }

        tracing::debug!(%query, "dispatching geocoding lookup");
        let geocoder = Arc::clone(&self.geocoder);
        self.mailbox.expect_one();
        self.dispatcher.spawn(async move {
            let outcome = geocoder.resolve(&query).await;
            AutofillCompletion { query, outcome }
        });
        Ok(())
    }

    /// Wait for the next lookup to finish. `None` if nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<AutofillCompletion> {
        self.mailbox.recv().await
    }

    /// Fill latitude and longitude from a finished lookup.
    ///
    /// On failure the form is left as it was and the error is handed back for
    /// display; editing can continue.
    pub fn apply_autofill(&mut self, completion: AutofillCompletion) -> Result<(), AddCityError> {
        if self.state.is_finished() {
            tracing::debug!(query = %completion.query, "discarding late geocoding result");
            return Err(AddCityError::Finished);
        }

        match completion.outcome {
            Ok(found) => {
                tracing::info!(query = %completion.query, name = %found.name, "autofilled coordinates");
                self.form.latitude = found.latitude;
                self.form.longitude = found.longitude;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(query = %completion.query, error = %e, "geocoding failed");
                Err(e.into())
            }
        }
    }

    /// Request a lookup and apply its result once it arrives.
    pub async fn autofill(&mut self) -> Result<(), AddCityError> {
        self.request_autofill()?;
        match self.next_completion().await {
            Some(completion) => self.apply_autofill(completion),
            None => Ok(()),
        }
    }

    /// Validate the form and, if it passes, emit the candidate and finish.
    pub fn save(&mut self, now: DateTime<Utc>) -> Result<CityCandidate, AddCityError> {
        self.ensure_editing()?;
        self.state = AddCityState::Validating;

        let CityForm {
            name,
            latitude,
            longitude,
        } = &self.form;

        if let Err(e) = validate_city_fields(name, latitude, longitude) {
            self.state = AddCityState::Editing;
            return Err(e.into());
        }

        let candidate = CityCandidate::new(
            name.trim().to_string(),
            latitude.trim().to_string(),
            longitude.trim().to_string(),
            now,
        );
        self.state = AddCityState::Resolved;
        Ok(candidate)
    }

    /// Abandon the flow without emitting a candidate.
    pub fn cancel(&mut self) {
        if !self.state.is_finished() {
            self.state = AddCityState::Rejected;
        }
    }

    fn ensure_editing(&self) -> Result<(), AddCityError> {
        if self.state.is_finished() {
            Err(AddCityError::Finished)
        } else {
            Ok(())
        }
    }
}
