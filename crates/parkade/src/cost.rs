//! Parking fee computation.
//!
//! Fees are a pure function of the ticket (vehicle class, spot class, entry
//! time) and the exit time. They are only computed at release.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::ticket::Ticket;
use crate::vehicle::{SpotType, VehicleType};

/// Monetary amount in cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Round a fractional currency value to the nearest cent.
    fn from_units(value: f64) -> Self {
        Self((value * 100.0).round().max(0.0) as u64)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

pub trait CostStrategy: Send + Sync {
    fn compute_cost(&self, ticket: &Ticket, exit_time: DateTime<Utc>) -> Amount;
}

/// Hourly rates per vehicle class and multipliers per spot class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateCard {
    pub car: f64,
    pub bus: f64,
    pub truck: f64,
    pub small: f64,
    pub medium: f64,
    pub large: f64,
    /// Shorter stays are billed as this many hours.
    pub minimum_hours: f64,
}

impl RateCard {
    fn base_rate(&self, vehicle_type: VehicleType) -> f64 {
        match vehicle_type {
            VehicleType::Car => self.car,
            VehicleType::Bus => self.bus,
            VehicleType::Truck => self.truck,
        }
    }

    fn spot_multiplier(&self, spot_type: SpotType) -> f64 {
        match spot_type {
            SpotType::Small => self.small,
            SpotType::Medium => self.medium,
            SpotType::Large => self.large,
        }
    }

    fn billed_hours(&self, ticket: &Ticket, exit_time: DateTime<Utc>) -> f64 {
        let millis = ticket.duration_until(exit_time).num_milliseconds() as f64;
        (millis / 3_600_000.0).max(self.minimum_hours)
    }

    fn charge(&self, ticket: &Ticket, exit_time: DateTime<Utc>) -> f64 {
        self.billed_hours(ticket, exit_time)
            * self.base_rate(ticket.vehicle.vehicle_type())
            * self.spot_multiplier(ticket.spot_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardCost {
    pub rates: RateCard,
}

impl Default for StandardCost {
    fn default() -> Self {
        Self {
            rates: RateCard {
                car: 10.0,
                bus: 25.0,
                truck: 20.0,
                small: 1.0,
                medium: 1.3,
                large: 1.5,
                minimum_hours: 0.5,
            },
        }
    }
}

impl CostStrategy for StandardCost {
    fn compute_cost(&self, ticket: &Ticket, exit_time: DateTime<Utc>) -> Amount {
        let amount = Amount::from_units(self.rates.charge(ticket, exit_time));
        tracing::debug!(
            ticket = %ticket.id,
            hours = self.rates.billed_hours(ticket, exit_time),
            %amount,
            "Standard fee computed"
        );
        amount
    }
}

/// Higher rates with a surcharge for entries during peak hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PremiumCost {
    pub rates: RateCard,
    pub peak_multiplier: f64,
    /// Peak window `[start, end)` in local hours.
    pub peak_hours: (u32, u32),
    pub utc_offset: FixedOffset,
}

impl Default for PremiumCost {
    fn default() -> Self {
        Self {
            rates: RateCard {
                car: 15.0,
                bus: 35.0,
                truck: 30.0,
                small: 1.2,
                medium: 1.6,
                large: 2.0,
                minimum_hours: 1.0,
            },
            peak_multiplier: 1.5,
            peak_hours: (9, 18),
            utc_offset: Utc.fix(),
        }
    }
}

impl PremiumCost {
    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    pub fn is_peak(&self, at: DateTime<Utc>) -> bool {
        let hour = at.with_timezone(&self.utc_offset).hour();
        let (start, end) = self.peak_hours;
        hour >= start && hour < end
    }
}

impl CostStrategy for PremiumCost {
    fn compute_cost(&self, ticket: &Ticket, exit_time: DateTime<Utc>) -> Amount {
        let peak = if self.is_peak(ticket.entry_time) {
            self.peak_multiplier
        } else {
            1.0
        };
        let amount = Amount::from_units(self.rates.charge(ticket, exit_time) * peak);
        tracing::debug!(ticket = %ticket.id, peak = peak > 1.0, %amount, "Premium fee computed");
        amount
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::ticket::TicketId;
    use crate::vehicle::Vehicle;

    fn ticket(vehicle_type: VehicleType, spot_type: SpotType, entry: DateTime<Utc>) -> Ticket {
        Ticket {
            id: TicketId::new(),
            vehicle: Vehicle::new("KA-01-1234", vehicle_type),
            spot_id: "F1-S1".to_string(),
            spot_type,
            floor_id: "F1".to_string(),
            entry_time: entry,
        }
    }

    fn off_peak() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 22, 0, 0).unwrap()
    }

    fn peak() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap()
    }

    #[test]
    fn amount_displays_cents() {
        assert_eq!(Amount::from_cents(1234).to_string(), "12.34");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn standard_applies_minimum_charge() {
        let t = ticket(VehicleType::Car, SpotType::Small, off_peak());
        let cost = StandardCost::default().compute_cost(&t, t.entry_time + Duration::seconds(5));
        assert_eq!(cost, Amount::from_cents(500));
    }

    #[test]
    fn standard_scales_with_duration_and_classes() {
        let standard = StandardCost::default();

        let car = ticket(VehicleType::Car, SpotType::Medium, off_peak());
        assert_eq!(
            standard.compute_cost(&car, car.entry_time + Duration::hours(2)),
            Amount::from_cents(2600)
        );

        let bus = ticket(VehicleType::Bus, SpotType::Large, off_peak());
        assert_eq!(
            standard.compute_cost(&bus, bus.entry_time + Duration::hours(3)),
            Amount::from_cents(11250)
        );
    }

    #[test]
    fn premium_minimum_is_one_hour() {
        let t = ticket(VehicleType::Car, SpotType::Small, off_peak());
        let cost = PremiumCost::default().compute_cost(&t, t.entry_time + Duration::minutes(10));
        assert_eq!(cost, Amount::from_cents(1800));
    }

    #[test]
    fn premium_surcharges_peak_entries() {
        let premium = PremiumCost::default();
        assert!(premium.is_peak(peak()));
        assert!(!premium.is_peak(off_peak()));

        let t = ticket(VehicleType::Car, SpotType::Small, peak());
        assert_eq!(
            premium.compute_cost(&t, t.entry_time + Duration::minutes(10)),
            Amount::from_cents(2700)
        );
    }

    #[test]
    fn premium_peak_window_respects_offset() {
        // 22:00 UTC is 09:00 the next morning at UTC+11.
        let offset = FixedOffset::east_opt(11 * 3600).unwrap();
        let premium = PremiumCost::default().with_utc_offset(offset);
        assert!(premium.is_peak(off_peak()));
        assert!(!premium.is_peak(peak()));
    }

    #[test]
    fn truck_large_standard() {
        let t = ticket(VehicleType::Truck, SpotType::Large, off_peak());
        assert_eq!(
            StandardCost::default().compute_cost(&t, t.entry_time + Duration::hours(1)),
            Amount::from_cents(3000)
        );
    }
}
