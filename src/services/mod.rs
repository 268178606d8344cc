//! Exercise services. Each owns one collection of the injected document store and is
//! constructed once at startup, then shared through `AppState`.

pub mod articulation;
pub mod collection;
pub mod documents;
pub mod receptive;

pub use articulation::ArticulationService;
pub use receptive::ReceptiveService;
