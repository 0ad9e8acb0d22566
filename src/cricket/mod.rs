pub mod features;
pub mod models;
pub mod validity;

pub use features::{derive, DerivedFeatures, FeatureRow};
pub use models::{City, MatchSituation, Team};
pub use validity::{is_valid, InvalidReason, Selection};
