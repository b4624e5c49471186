use crate::cost::{pairwise, CostProvider, CostProviderError};
use crate::model::{CostMatrix, Location};

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between latitude/longitude pairs. Kilometres by
/// default; minutes of travel when an average speed is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineCostProvider {
    average_speed_kmh: Option<f64>,
}

impl HaversineCostProvider {
    pub fn new(average_speed_kmh: Option<f64>) -> Self {
        Self { average_speed_kmh }
    }
}

pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

impl CostProvider for HaversineCostProvider {
    fn name(&self) -> &str {
        "haversine"
    }

    fn costs(
        &self,
        units: &[Location],
        incidents: &[Location],
    ) -> Result<CostMatrix, CostProviderError> {
        match self.average_speed_kmh {
            Some(speed) if speed > 0.0 => {
                pairwise(units, incidents, |a, b| haversine_km(a, b) / speed * 60.0)
            }
            Some(speed) => Err(CostProviderError::Unavailable(format!(
                "average speed must be positive, got {speed}"
            ))),
            None => pairwise(units, incidents, haversine_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let km = haversine_km(&Location::new(0.0, 0.0), &Location::new(1.0, 0.0));
        assert!((km - 111.19).abs() < 0.05, "got {km}");
    }

    #[test]
    fn average_speed_converts_to_minutes() {
        let provider = HaversineCostProvider::new(Some(60.0));
        let units = [Location::new(-31.95, 115.86)];
        let incidents = [Location::new(-31.95, 115.86), Location::new(-32.05, 115.86)];
        let matrix = provider.costs(&units, &incidents).unwrap();
        assert_eq!(matrix.get(0, 0), 0.0);
        let km = haversine_km(&units[0], &incidents[1]);
        assert!((matrix.get(0, 1) - km).abs() < 1e-9);
    }
}
