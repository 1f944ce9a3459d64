// Domain layer - value types and pure usage aggregation
pub mod dashboard;
pub mod model;
pub mod series;
pub mod time_axis;
pub mod usage;
pub mod window;
