//! CV-to-vacancy matching core: extraction, normalization, scoring, ranking.

pub mod embedding;
pub mod extractor;
pub mod ranking;
pub mod scoring;
pub mod taxonomy;
pub mod vacancy;

pub use embedding::{EmbeddingGateway, HuggingFaceGateway, NoopEmbeddingGateway};
pub use extractor::{CandidateProfile, ExtractError, ProfileExtractor, MIN_CV_LENGTH};
pub use ranking::{MatchEngine, MatchReport, ScoringPath, TierCounts, DEFAULT_LIMIT};
pub use scoring::{MatchResult, MatchScorer, MatchTier};
pub use taxonomy::{MatchTaxonomy, RegionTier};
pub use vacancy::{load_vacancies, normalize_records, Vacancy, VacancySourceError};
