//! Static climate sample endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
pub struct ClimateSample {
    pub temperature: i32,
    pub humidity: i32,
    pub wind_speed: i32,
    pub precipitation: f64,
}

/// GET /climate_data - fixed sample reading
pub async fn climate_data_handler() -> Json<ClimateSample> {
    Json(ClimateSample {
        temperature: 25,
        humidity: 50,
        wind_speed: 10,
        precipitation: 0.5,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_climate_data_is_fixed() {
        let Json(sample) = climate_data_handler().await;
        assert_eq!(
            serde_json::to_value(&sample).unwrap(),
            serde_json::json!({
                "temperature": 25,
                "humidity": 50,
                "wind_speed": 10,
                "precipitation": 0.5
            })
        );
    }
}
