// Core algorithm exports
pub mod combiner;
pub mod distance;
pub mod filters;
pub mod location;
pub mod matcher;
pub mod reasons;
pub mod regions;
pub mod salary;
pub mod scoring;
pub mod weights;

pub use combiner::{CombinedScore, ScoreCombiner};
pub use distance::{distance_km, haversine_distance};
pub use filters::{is_eligible, passes_category_gate};
pub use location::match_location;
pub use matcher::{Matcher, RankError, RankedPage};
pub use reasons::generate_reasons;
pub use salary::{parse_salary, SalaryRange};
pub use scoring::{compute_breakdown, ScoringContext};
pub use weights::{Dimension, WeightError, WeightingProfile};
