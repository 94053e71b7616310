//! Core modules for Areawatch

pub mod distance;
pub mod smoother;
pub mod evaluator;
pub mod tracker;
pub mod store;
pub mod api;

pub use distance::haversine_distance;
pub use smoother::{LocationSmoother, weighted_average};
pub use evaluator::{GeofenceEvaluator, Evaluation};
pub use tracker::Tracker;
pub use store::{AreaStore, InMemoryAreaStore, JsonFileAreaStore, save_areas, load_areas};
pub use api::{create_router, run_server};
