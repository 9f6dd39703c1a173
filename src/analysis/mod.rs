//! Statistics behind the EDA tab and the charts.

pub mod outliers;
pub mod stats;
pub mod wind;
