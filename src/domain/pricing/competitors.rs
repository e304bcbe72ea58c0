//! Competitor set and their observed monthly rates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{CompetitorId, DomainError, ErrorCode, Month};

/// Cluster filter value meaning "every cluster".
pub const ALL_CLUSTERS: &str = "all";

/// Periods tracked per competitor per month.
pub const PERIODS_PER_MONTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    pub cluster: String,
    #[serde(default)]
    pub score: f64,
    /// Kilometres from our property.
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub avg_rate: f64,
    #[serde(default)]
    pub note: String,
}

impl Competitor {
    pub fn new(name: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            id: CompetitorId::new(),
            name: name.into(),
            cluster: cluster.into(),
            score: 0.0,
            distance_km: 0.0,
            url: String::new(),
            avg_rate: 0.0,
            note: String::new(),
        }
    }
}

/// A date range inside a month with the observed price.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RatePeriod {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyRateCard {
    pub periods: [RatePeriod; PERIODS_PER_MONTH],
}

impl MonthlyRateCard {
    /// Mean of the positive prices; zero when none are set.
    pub fn average(&self) -> f64 {
        let priced: Vec<f64> = self
            .periods
            .iter()
            .map(|p| p.price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .collect();
        if priced.is_empty() {
            return 0.0;
        }
        priced.iter().sum::<f64>() / priced.len() as f64
    }
}

/// Competitors plus their rate cards, keyed by competitor and month.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorBook {
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    rates: BTreeMap<CompetitorId, BTreeMap<Month, MonthlyRateCard>>,
}

impl CompetitorBook {
    pub fn add(&mut self, competitor: Competitor) -> CompetitorId {
        let id = competitor.id;
        self.competitors.push(competitor);
        id
    }

    /// Removes a competitor and its rate cards.
    pub fn remove(&mut self, id: CompetitorId) -> Result<(), DomainError> {
        let before = self.competitors.len();
        self.competitors.retain(|c| c.id != id);
        if self.competitors.len() == before {
            return Err(DomainError::new(
                ErrorCode::CompetitorNotFound,
                "Competitor not found",
            )
            .with_detail("id", id.to_string()));
        }
        self.rates.remove(&id);
        Ok(())
    }

    /// Competitors in `cluster`, or all of them for [`ALL_CLUSTERS`].
    pub fn in_cluster<'a>(&'a self, cluster: &'a str) -> impl Iterator<Item = &'a Competitor> {
        self.competitors
            .iter()
            .filter(move |c| cluster == ALL_CLUSTERS || c.cluster == cluster)
    }

    /// Rate card for a month; empty when nothing was recorded.
    pub fn rate_card(&self, id: CompetitorId, month: Month) -> MonthlyRateCard {
        self.rates
            .get(&id)
            .and_then(|months| months.get(&month))
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_period(
        &mut self,
        id: CompetitorId,
        month: Month,
        index: usize,
        period: RatePeriod,
    ) -> Result<(), DomainError> {
        if index >= PERIODS_PER_MONTH {
            return Err(DomainError::validation("period", "Period index out of range"));
        }
        if !self.competitors.iter().any(|c| c.id == id) {
            return Err(DomainError::new(
                ErrorCode::CompetitorNotFound,
                "Competitor not found",
            ));
        }
        let card = self.rates.entry(id).or_default().entry(month).or_default();
        card.periods[index] = period;
        Ok(())
    }

    pub fn monthly_average(&self, id: CompetitorId, month: Month) -> f64 {
        self.rate_card(id, month).average()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(price: f64) -> RatePeriod {
        RatePeriod {
            from: "01".into(),
            to: "10".into(),
            price,
        }
    }

    #[test]
    fn average_ignores_unpriced_periods() {
        let card = MonthlyRateCard {
            periods: [period(100.0), period(0.0), period(140.0)],
        };
        assert_eq!(card.average(), 120.0);
        assert_eq!(MonthlyRateCard::default().average(), 0.0);
    }

    #[test]
    fn cluster_filter_supports_all() {
        let mut book = CompetitorBook::default();
        book.add(Competitor::new("Bella Vista", "seaside"));
        book.add(Competitor::new("Centro", "old-town"));

        assert_eq!(book.in_cluster("seaside").count(), 1);
        assert_eq!(book.in_cluster(ALL_CLUSTERS).count(), 2);
        assert_eq!(book.in_cluster("mountain").count(), 0);
    }

    #[test]
    fn periods_are_stored_per_month() {
        let mut book = CompetitorBook::default();
        let id = book.add(Competitor::new("Mare", "seaside"));
        book.set_period(id, Month::July, 0, period(180.0)).unwrap();
        book.set_period(id, Month::July, 2, period(220.0)).unwrap();

        assert_eq!(book.monthly_average(id, Month::July), 200.0);
        assert_eq!(book.monthly_average(id, Month::June), 0.0);
        assert!(book.set_period(id, Month::July, 3, period(1.0)).is_err());
    }

    #[test]
    fn removing_competitor_drops_rates() {
        let mut book = CompetitorBook::default();
        let id = book.add(Competitor::new("Mare", "seaside"));
        book.set_period(id, Month::July, 0, period(180.0)).unwrap();
        book.remove(id).unwrap();
        assert_eq!(book.monthly_average(id, Month::July), 0.0);
        assert_eq!(book.remove(id).unwrap_err().code, ErrorCode::CompetitorNotFound);
    }

    #[test]
    fn book_round_trips_through_json() {
        let mut book = CompetitorBook::default();
        let id = book.add(Competitor::new("Mare", "seaside"));
        book.set_period(id, Month::May, 1, period(95.0)).unwrap();
        let json = serde_json::to_string(&book).unwrap();
        let back: CompetitorBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
