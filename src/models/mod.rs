// Model exports
pub mod documents;
pub mod domain;
pub mod requests;
pub mod responses;

pub use documents::{JobDocument, LegacyJobDocument, RawJobDocument};
pub use domain::{
    Coordinates, DaySchedule, ExclusionSet, JobPosting, JobSalary, JobStatus, MatchResult,
    SalaryExpectation, SalaryUnit, WorkerProfile,
};
pub use requests::{RankRequest, RecordSwipeRequest, ScoreJobRequest};
pub use responses::{
    ErrorResponse, HealthResponse, RankResponse, RecordSwipeResponse, WeightingProfilesResponse,
};
