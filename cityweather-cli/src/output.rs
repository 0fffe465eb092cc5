use chrono::Local;
use cityweather_core::City;

pub fn print_cities(cities: &[City]) {
    if cities.is_empty() {
        println!("No cities yet. Add one with `cityweather add <name>`.");
        return;
    }

    println!(
        "{:>4}  {:<24} {:>16}  {:<22} {}",
        "ID", "CITY", "TEMPERATURE", "COORDINATES", "LAST SYNC"
    );
    for city in cities {
        println!("{}", format_city(city));
    }
}

pub fn format_city(city: &City) -> String {
    let coordinates = format!("{}, {}", city.latitude, city.longitude);
    format!(
        "{:>4}  {:<24} {:>16}  {:<22} {}",
        city.id,
        city.name,
        city.temperature,
        coordinates,
        city.last_sync_time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn format_city_includes_every_column() {
        let city = City {
            id: 3,
            name: "Paris".into(),
            temperature: "14.2".into(),
            latitude: "48.85".into(),
            longitude: "2.35".into(),
            icon_flag: 1,
            last_sync_time: Utc::now(),
        };

        let line = format_city(&city);
        assert!(line.starts_with("   3  Paris"));
        assert!(line.contains("14.2"));
        assert!(line.contains("48.85, 2.35"));
    }
}
