pub mod episode;
pub mod error;
pub mod ids;
pub mod observation;
pub mod options;
pub mod progression;

pub use episode::{AkiEpisode, Episode, EpisodeKind, Threshold};
pub use error::{Exclusion, ModelError, PatientError, Result};
pub use ids::PatientId;
pub use observation::{Baseline, Observation, PatientHistory};
pub use options::{DuplicateDatePolicy, EngineOptions};
pub use progression::{ProgressionRecord, ThresholdProgression};
