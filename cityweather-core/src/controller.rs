//! The two flows the UI drives: adding a city and keeping the list fresh.
//!
//! Both controllers start network work in the background and hand results
//! back through `next_completion`; the owner applies them with `apply_*` so
//! that list and store mutation stays on one context.

pub mod add_city;
pub mod city_list;

pub use add_city::{AddCityController, AddCityError, AddCityState, AutofillCompletion, CityForm};
pub use city_list::{CityListController, CityListError, CityListEvent, ForecastCompletion};
