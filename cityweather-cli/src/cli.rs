use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use cityweather_core::{
    AddCityController, CityListController, CityListEvent, Config, Field, SqliteCityStore,
    controller::AddCityError,
    provider::{forecast_from_config, geocoder_from_config},
};
use inquire::{Confirm, CustomType, InquireError, Text};
use std::{path::PathBuf, sync::Arc};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Track current temperatures for your cities")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit the client identifier and provider endpoints.
    Configure,

    /// Show saved cities.
    List,

    /// Add a city. Coordinates are looked up by name when not given.
    Add {
        /// City name, e.g. "Paris".
        name: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<String>,
    },

    /// Fetch the current temperature for one city.
    Refresh {
        /// City id as shown by `list`.
        id: i64,
    },

    /// Remove one city.
    Delete { id: i64 },

    /// Remove every saved city.
    DeleteAll {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;

        match self.command {
            Command::Configure => configure(config, self.config)?,
            Command::List => {
                let list = open_list(&config)?;
                output::print_cities(list.cities());
            }
            Command::Add { name, lat, lon } => add(&config, name, lat, lon).await?,
            Command::Refresh { id } => refresh(&config, id).await?,
            Command::Delete { id } => {
                let mut list = open_list(&config)?;
                list.delete_city(id)
                    .with_context(|| format!("Failed to delete city {id}"))?;
                println!("Deleted city {id}.");
            }
            Command::DeleteAll { yes } => {
                let confirmed = yes
                    || Confirm::new("Delete all saved cities?")
                        .with_default(false)
                        .prompt()?;
                if confirmed {
                    let mut list = open_list(&config)?;
                    list.delete_all()?;
                    println!("All cities deleted.");
                }
            }
        }

        Ok(())
    }

    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

fn open_list(config: &Config) -> Result<CityListController<SqliteCityStore>> {
    let path = config.database_path()?;
    let store = SqliteCityStore::open(&path)
        .with_context(|| format!("Failed to open city database: {}", path.display()))?;
    let forecast = Arc::from(forecast_from_config(config));
    Ok(CityListController::new(store, forecast)?)
}

fn configure(mut config: Config, path: Option<PathBuf>) -> Result<()> {
    config.user_agent = Text::new("Client identifier sent to the geocoder (User-Agent):")
        .with_default(&config.user_agent)
        .prompt()?;
    config.geocoding.endpoint = Text::new("Geocoding endpoint:")
        .with_default(&config.geocoding.endpoint)
        .prompt()?;
    config.forecast.endpoint = Text::new("Forecast endpoint:")
        .with_default(&config.forecast.endpoint)
        .prompt()?;

    config.forecast.max_stale_secs =
        CustomType::<u64>::new("Accept cached forecasts up to N seconds old (0 to disable):")
            .with_default(config.forecast.max_stale_secs)
            .prompt()?;

    match path {
        Some(path) => config.save_to(&path)?,
        None => config.save()?,
    }
    println!("Configuration saved.");
    Ok(())
}

async fn add(config: &Config, name: String, lat: Option<String>, lon: Option<String>) -> Result<()> {
    let mut list = open_list(config)?;
    let geocoder = geocoder_from_config(config)
        .context("Invalid geocoding settings; run `cityweather configure`")?;
    let mut form = AddCityController::new(Arc::from(geocoder));
    form.set_name(name.as_str())?;

    if lat.is_none() || lon.is_none() {
        println!("Looking up coordinates for {name}...");
        if let Err(e) = form.autofill().await {
            tracing::debug!(error = %e, "autofill failed");
            eprintln!("{}", e.user_message());
        }
    }
    // Explicit coordinates win over looked-up ones.
    if let Some(lat) = lat {
        form.set_latitude(lat)?;
    }
    if let Some(lon) = lon {
        form.set_longitude(lon)?;
    }

    loop {
        match form.save(Utc::now()) {
            Ok(candidate) => {
                let id = list.add_city(candidate)?;
                if let Some(city) = list.city(id) {
                    println!("Added:");
                    println!("{}", output::format_city(city));
                }
                return Ok(());
            }
            Err(AddCityError::Validation(e)) => {
                eprintln!("{}", e.user_message());
                let field = e.field();
                match prompt_field(&form, field) {
                    Ok(value) => match field {
                        Field::Name => form.set_name(value)?,
                        Field::Latitude => form.set_latitude(value)?,
                        Field::Longitude => form.set_longitude(value)?,
                    },
                    Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                        form.cancel();
                        println!("Cancelled.");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn prompt_field(form: &AddCityController, field: Field) -> Result<String, InquireError> {
    let current = match field {
        Field::Name => &form.form().name,
        Field::Latitude => &form.form().latitude,
        Field::Longitude => &form.form().longitude,
    };
    let label = match field {
        Field::Name => "City name:",
        Field::Latitude => "Latitude (-90..90):",
        Field::Longitude => "Longitude (-180..180):",
    };
    Text::new(label).with_initial_value(current).prompt()
}

async fn refresh(config: &Config, id: i64) -> Result<()> {
    let mut list = open_list(config)?;
    let mut events = list.subscribe();

    list.refresh(id)?;
    if let Some(city) = list.city(id) {
        println!("Refreshing {}...", city.name);
    }
    list.settle().await?;

    while let Ok(event) = events.try_recv() {
        if let CityListEvent::Notice(message) = event {
            eprintln!("{message}");
        }
    }

    if let Some(city) = list.city(id) {
        println!("{}", output::format_city(city));
    }
    Ok(())
}
