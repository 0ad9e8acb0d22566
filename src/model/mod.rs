pub mod baseline;
pub mod http;
pub mod provider;

pub use baseline::RunRateProjection;
pub use http::HttpScoreModel;
pub use provider::{ModelError, ScoreModel};
