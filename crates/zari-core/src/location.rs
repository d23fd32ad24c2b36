//! Delivery fee table.
//!
//! Fees are flat per (emirate, city). An unknown pair costs nothing rather
//! than failing checkout.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{DeliveryLocation, FulfillmentMethod};

/// All delivery locations, loaded once per checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLocations {
    locations: Vec<DeliveryLocation>,
}

impl DeliveryLocations {
    pub fn new(locations: Vec<DeliveryLocation>) -> Self {
        DeliveryLocations { locations }
    }

    /// Exact-match lookup.
    pub fn find(&self, emirate: &str, city: &str) -> Option<&DeliveryLocation> {
        self.locations
            .iter()
            .find(|loc| loc.emirate == emirate && loc.city == city)
    }

    /// Fee for a pair; zero when the pair is unknown.
    pub fn fee_for(&self, emirate: &str, city: &str) -> Money {
        self.find(emirate, city)
            .map(|loc| loc.cost)
            .unwrap_or_default()
    }

    /// Fee for a fulfillment choice. Pickup and "not chosen yet" are free.
    pub fn fee_for_method(
        &self,
        method: Option<FulfillmentMethod>,
        emirate: &str,
        city: &str,
    ) -> Money {
        match method {
            Some(FulfillmentMethod::Delivery) => self.fee_for(emirate, city),
            _ => Money::zero(),
        }
    }

    /// Distinct emirates, sorted.
    pub fn emirates(&self) -> Vec<&str> {
        let mut emirates: Vec<&str> = self.locations.iter().map(|l| l.emirate.as_str()).collect();
        emirates.sort_unstable();
        emirates.dedup();
        emirates
    }

    /// Cities of one emirate, sorted.
    pub fn cities(&self, emirate: &str) -> Vec<&str> {
        let mut cities: Vec<&str> = self
            .locations
            .iter()
            .filter(|l| l.emirate == emirate)
            .map(|l| l.city.as_str())
            .collect();
        cities.sort_unstable();
        cities.dedup();
        cities
    }

    pub fn all(&self) -> &[DeliveryLocation] {
        &self.locations
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DeliveryLocations {
        let loc = |emirate: &str, city: &str, cost: i64| DeliveryLocation {
            id: format!("{emirate}-{city}"),
            emirate: emirate.to_string(),
            city: city.to_string(),
            cost: Money::from_units(cost),
        };
        DeliveryLocations::new(vec![
            loc("Dubai", "Jumeirah", 25),
            loc("Ajman", "Al Nuaimiya", 15),
            loc("Dubai", "Deira", 20),
        ])
    }

    #[test]
    fn test_fee_lookup() {
        let t = table();
        assert_eq!(t.fee_for("Dubai", "Deira"), Money::from_units(20));
        assert_eq!(t.fee_for("Dubai", "Nowhere"), Money::zero());
        assert_eq!(t.fee_for("dubai", "Deira"), Money::zero());
    }

    #[test]
    fn test_pickup_is_free() {
        let t = table();
        assert_eq!(
            t.fee_for_method(Some(FulfillmentMethod::Pickup), "Dubai", "Deira"),
            Money::zero()
        );
        assert_eq!(
            t.fee_for_method(Some(FulfillmentMethod::Delivery), "Ajman", "Al Nuaimiya"),
            Money::from_units(15)
        );
        assert_eq!(t.fee_for_method(None, "Dubai", "Deira"), Money::zero());
    }

    #[test]
    fn test_emirates_and_cities_sorted() {
        let t = table();
        assert_eq!(t.emirates(), vec!["Ajman", "Dubai"]);
        assert_eq!(t.cities("Dubai"), vec!["Deira", "Jumeirah"]);
        assert!(t.cities("Fujairah").is_empty());
    }
}
