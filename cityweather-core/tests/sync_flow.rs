//! End-to-end add and refresh flow: wiremock providers, SQLite store.

use std::sync::Arc;

use chrono::Utc;
use cityweather_core::controller::{AddCityError, AddCityState, CityListEvent};
use cityweather_core::{
    AddCityController, CityListController, CityStore, ForecastClient, GeocodingClient,
    SqliteCityStore,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_geocoder(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"lat": "48.85", "lon": "2.35", "display_name": "Paris, France"}
        ])))
        .mount(server)
        .await;
}

fn clients(server: &MockServer) -> (Arc<GeocodingClient>, Arc<ForecastClient>) {
    (
        Arc::new(
            GeocodingClient::new(format!("{}/search", server.uri()), "cityweather-test".into())
                .unwrap(),
        ),
        Arc::new(ForecastClient::new(format!("{}/v1/forecast", server.uri()))),
    )
}

#[tokio::test]
async fn add_then_refresh_persists_everything() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "48.85"))
        .and(query_param("longitude", "2.35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current_weather": {"temperature": 21.5}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (geocoder, forecast) = clients(&server);
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cities.db");

    let mut add = AddCityController::new(geocoder);
    add.set_name("Paris").unwrap();
    add.autofill().await.unwrap();
    let candidate = add.save(Utc::now()).unwrap();
    assert_eq!(add.state(), AddCityState::Resolved);

    let mut list = CityListController::new(SqliteCityStore::open(&db).unwrap(), forecast).unwrap();
    assert!(list.cities().is_empty());

    let id = list.add_city(candidate.clone()).unwrap();
    assert_eq!(list.cities().len(), 1);
    assert_eq!(list.cities()[0], candidate.clone().with_id(id));

    list.refresh(id).unwrap();
    list.settle().await.unwrap();
    drop(list);

    let reopened = SqliteCityStore::open(&db).unwrap();
    let stored = reopened.select_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, id);
    assert_eq!(stored[0].name, "Paris");
    assert_eq!(stored[0].temperature, "21.5");
    assert!(stored[0].last_sync_time >= candidate.last_sync_time());
}

#[tokio::test]
async fn failed_refresh_still_writes_error_text_and_sync_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hourly": {"temperature_2m": [1.0, 2.0]}
        })))
        .mount(&server)
        .await;

    let (geocoder, forecast) = clients(&server);
    let mut add = AddCityController::new(geocoder);
    add.set_name("Quito").unwrap();
    add.set_latitude("-0.18").unwrap();
    add.set_longitude("-78.47").unwrap();
    let candidate = add.save(Utc::now()).unwrap();

    let mut list =
        CityListController::new(SqliteCityStore::in_memory().unwrap(), forecast).unwrap();
    let id = list.add_city(candidate).unwrap();
    let before = list.city(id).unwrap().last_sync_time;
    let mut events = list.subscribe();

    list.refresh(id).unwrap();
    let completion = list.next_completion().await.unwrap();
    let attempted_at = completion.attempted_at;
    list.apply_forecast(completion).unwrap();

    let stored = list.load_all().unwrap()[0].clone();
    assert_eq!(stored.temperature, "data error");
    assert_eq!(stored.last_sync_time, attempted_at);
    assert!(stored.last_sync_time >= before);

    assert_eq!(events.recv().await.unwrap(), CityListEvent::CityUpdated(id));
    assert_eq!(
        events.recv().await.unwrap(),
        CityListEvent::Notice("Data processing error".into())
    );
}

#[tokio::test]
async fn autofill_failure_does_not_block_manual_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (geocoder, _) = clients(&server);
    let mut add = AddCityController::new(geocoder);
    add.set_name("Reykjavik").unwrap();

    let err = add.autofill().await.unwrap_err();
    assert_eq!(err.user_message(), "Server error");
    assert_eq!(add.state(), AddCityState::Editing);

    add.set_latitude("64.15").unwrap();
    let err = add.save(Utc::now()).unwrap_err();
    assert!(matches!(err, AddCityError::Validation(_)));

    add.set_longitude("-21.94").unwrap();
    let candidate = add.save(Utc::now()).unwrap();
    assert_eq!(candidate.name(), "Reykjavik");
}

#[tokio::test]
async fn delete_all_then_load_all_is_empty() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;

    let (geocoder, forecast) = clients(&server);
    let mut list =
        CityListController::new(SqliteCityStore::in_memory().unwrap(), forecast).unwrap();

    for _ in 0..3 {
        let mut add = AddCityController::new(geocoder.clone());
        add.set_name("Paris").unwrap();
        add.autofill().await.unwrap();
        list.add_city(add.save(Utc::now()).unwrap()).unwrap();
    }
    assert_eq!(list.cities().len(), 3);

    list.delete_all().unwrap();
    assert!(list.load_all().unwrap().is_empty());
}
