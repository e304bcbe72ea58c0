//! Pricing module - rate ladders, daily forecasts and competitor tracking.

mod competitors;
mod forecast;
mod pressure;

pub use competitors::{
    Competitor, CompetitorBook, MonthlyRateCard, RatePeriod, ALL_CLUSTERS, PERIODS_PER_MONTH,
};
pub use forecast::{daily_forecast, BaseRate, DailyForecast, ForecastDay, RateStrategy};
pub use pressure::{BaseRates, PressureLevel, PressureTable, RateLadder, MAX_BARS};
