use super::embedding::{cosine_similarity, EmbeddingGateway, NoopEmbeddingGateway};
use super::extractor::{CandidateProfile, ExtractError, LocationGuess, ProfileExtractor};
use super::scoring::{MatchResult, MatchScorer, MatchTier};
use super::taxonomy::MatchTaxonomy;
use super::vacancy::{normalize_records, Vacancy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_LIMIT: usize = 10;

/// Which scoring path produced the totals in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPath {
    Categorical,
    SemanticAugmented,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TierCounts {
    pub tier1: usize,
    pub tier2: usize,
    pub tier3: usize,
}

impl TierCounts {
    fn tally(matches: &[MatchResult]) -> Self {
        let mut counts = Self::default();
        for result in matches {
            match result.tier {
                MatchTier::Tier1 => counts.tier1 += 1,
                MatchTier::Tier2 => counts.tier2 += 1,
                MatchTier::Tier3 => counts.tier3 += 1,
            }
        }
        counts
    }
}

/// Ordered match list with per-pair sub-scores and summary tier counts.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub candidate_function: String,
    pub candidate_location: LocationGuess,
    pub generated_at: DateTime<Utc>,
    pub scoring_path: ScoringPath,
    pub matches: Vec<MatchResult>,
    pub tier_counts: TierCounts,
}

/// Stateless matching engine: extraction, normalization, scoring, and
/// ranking wired around one taxonomy and one embedding gateway. Each ranking
/// call is a pure function of its inputs apart from the single optional
/// embedding request.
pub struct MatchEngine {
    taxonomy: MatchTaxonomy,
    embeddings: Box<dyn EmbeddingGateway>,
}

impl MatchEngine {
    pub fn new(taxonomy: MatchTaxonomy, embeddings: Box<dyn EmbeddingGateway>) -> Self {
        Self {
            taxonomy,
            embeddings,
        }
    }

    /// Engine without an embedding provider; every ranking call takes the
    /// categorical path.
    pub fn categorical(taxonomy: MatchTaxonomy) -> Self {
        Self::new(taxonomy, Box::new(NoopEmbeddingGateway))
    }

    pub fn taxonomy(&self) -> &MatchTaxonomy {
        &self.taxonomy
    }

    pub fn extract_profile(&self, cv_text: &str) -> Result<CandidateProfile, ExtractError> {
        ProfileExtractor::new(&self.taxonomy).extract(cv_text)
    }

    /// Extracts the candidate profile, normalizes the raw vacancy records,
    /// and ranks the result. The only failure is a too-short CV.
    pub fn rank(
        &self,
        cv_text: &str,
        records: &[Value],
        limit: Option<usize>,
    ) -> Result<MatchReport, ExtractError> {
        let profile = self.extract_profile(cv_text)?;
        let vacancies = normalize_records(records);
        Ok(self.rank_profile(&profile, cv_text, &vacancies, limit))
    }

    /// Scores the candidate against every vacancy, sorts descending by total
    /// score (stable, so input order breaks ties), and truncates to `limit`.
    pub fn rank_profile(
        &self,
        profile: &CandidateProfile,
        cv_text: &str,
        vacancies: &[Vacancy],
        limit: Option<usize>,
    ) -> MatchReport {
        let limit = match limit {
            Some(value) if value > 0 => value,
            _ => DEFAULT_LIMIT,
        };

        let scorer = MatchScorer::new(&self.taxonomy);
        let cv_text_lower = cv_text.to_lowercase();
        let similarities = self.fetch_similarities(cv_text, vacancies);
        let scoring_path = match similarities {
            Some(_) => ScoringPath::SemanticAugmented,
            None => ScoringPath::Categorical,
        };

        let mut matches: Vec<MatchResult> = vacancies
            .iter()
            .enumerate()
            .map(|(index, vacancy)| {
                let mut result = scorer.score(profile, vacancy);
                if let Some(ref sims) = similarities {
                    let similarity = sims[index];
                    result.semantic_score = Some(similarity);
                    result.total_score =
                        scorer.semantic_total(similarity, profile, &cv_text_lower, vacancy);
                    result.tier = MatchTier::from_score(result.total_score);
                }
                result
            })
            .collect();

        matches.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        matches.truncate(limit);

        let tier_counts = TierCounts::tally(&matches);

        MatchReport {
            candidate_function: profile.target_function.clone(),
            candidate_location: profile.location.clone(),
            generated_at: Utc::now(),
            scoring_path,
            matches,
            tier_counts,
        }
    }

    /// One batched embedding request per ranking session: candidate text
    /// first, then every vacancy. Any failure or short response degrades to
    /// the categorical path.
    fn fetch_similarities(&self, cv_text: &str, vacancies: &[Vacancy]) -> Option<Vec<f32>> {
        if vacancies.is_empty() {
            return None;
        }

        let mut texts = Vec::with_capacity(vacancies.len() + 1);
        texts.push(cv_text.to_string());
        texts.extend(vacancies.iter().map(Vacancy::search_text));

        let vectors = match self.embeddings.embed(&texts) {
            Ok(vectors) => vectors,
            Err(err) => {
                warn!(error = %err, "embedding provider failed, using categorical scoring");
                return None;
            }
        };

        if vectors.len() != texts.len() {
            if !vectors.is_empty() {
                warn!(
                    expected = texts.len(),
                    received = vectors.len(),
                    "embedding provider returned a partial batch, using categorical scoring"
                );
            }
            return None;
        }

        let candidate = &vectors[0];
        Some(
            vectors[1..]
                .iter()
                .map(|vector| cosine_similarity(candidate, vector))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::embedding::EmbeddingError;

    struct FailingGateway;

    impl EmbeddingGateway for FailingGateway {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Status(503))
        }
    }

    struct StubGateway {
        vectors: Vec<Vec<f32>>,
    }

    impl EmbeddingGateway for StubGateway {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(self.vectors.clone())
        }
    }

    fn cv_text() -> &'static str {
        "Elektromonteur uit Arnhem met 8 jaar ervaring in laagspanning en kabel installatie"
    }

    fn vacancy(title: &str, location: &str) -> Vacancy {
        Vacancy {
            id: String::new(),
            title: title.to_string(),
            company: "Testbedrijf".to_string(),
            location: location.to_string(),
            skills: Vec::new(),
            salary_min: 0,
            salary_max: 0,
            contact_name: String::new(),
            contact_email: String::new(),
            url: String::new(),
        }
    }

    #[test]
    fn gateway_failure_degrades_to_categorical_path() {
        let engine = MatchEngine::new(MatchTaxonomy::dutch_technical(), Box::new(FailingGateway));
        let profile = engine.extract_profile(cv_text()).expect("profile extracts");
        let vacancies = vec![vacancy("Elektromonteur", "Arnhem")];

        let report = engine.rank_profile(&profile, cv_text(), &vacancies, None);

        assert_eq!(report.scoring_path, ScoringPath::Categorical);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].total_score, 100);
        assert!(report.matches[0].semantic_score.is_none());
    }

    #[test]
    fn stub_vectors_switch_to_semantic_path() {
        let vectors = vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ];
        let engine = MatchEngine::new(
            MatchTaxonomy::dutch_technical(),
            Box::new(StubGateway { vectors }),
        );
        let profile = engine.extract_profile(cv_text()).expect("profile extracts");
        let vacancies = vec![
            vacancy("Lasser", "Rotterdam"),
            vacancy("Werkvoorbereider", "Ede"),
        ];

        let report = engine.rank_profile(&profile, cv_text(), &vacancies, None);

        assert_eq!(report.scoring_path, ScoringPath::SemanticAugmented);
        for result in &report.matches {
            assert!(result.semantic_score.is_some());
            assert!(result.total_score <= 100);
        }
        // Identical vectors beat the orthogonal pair.
        assert_eq!(report.matches[0].vacancy.title, "Lasser");
    }

    #[test]
    fn partial_embedding_batch_degrades() {
        let engine = MatchEngine::new(
            MatchTaxonomy::dutch_technical(),
            Box::new(StubGateway {
                vectors: vec![vec![1.0, 0.0]],
            }),
        );
        let profile = engine.extract_profile(cv_text()).expect("profile extracts");
        let vacancies = vec![vacancy("Monteur", "Ede"), vacancy("Lasser", "Tiel")];

        let report = engine.rank_profile(&profile, cv_text(), &vacancies, None);
        assert_eq!(report.scoring_path, ScoringPath::Categorical);
    }

    #[test]
    fn ranking_is_stable_for_equal_scores() {
        let engine = MatchEngine::categorical(MatchTaxonomy::dutch_technical());
        let profile = engine.extract_profile(cv_text()).expect("profile extracts");
        // Two vacancies with identical categorical scores.
        let vacancies = vec![
            vacancy("Lasser", "Rotterdam"),
            vacancy("Verspaner", "Tilburg"),
        ];

        let report = engine.rank_profile(&profile, cv_text(), &vacancies, None);

        assert_eq!(report.matches[0].total_score, report.matches[1].total_score);
        assert_eq!(report.matches[0].vacancy.title, "Lasser");
        assert_eq!(report.matches[1].vacancy.title, "Verspaner");
    }

    #[test]
    fn limit_truncates_and_zero_means_default() {
        let engine = MatchEngine::categorical(MatchTaxonomy::dutch_technical());
        let profile = engine.extract_profile(cv_text()).expect("profile extracts");
        let vacancies: Vec<Vacancy> = (0..15)
            .map(|i| vacancy(&format!("Vacature {i}"), "Arnhem"))
            .collect();

        let limited = engine.rank_profile(&profile, cv_text(), &vacancies, Some(3));
        assert_eq!(limited.matches.len(), 3);

        let defaulted = engine.rank_profile(&profile, cv_text(), &vacancies, Some(0));
        assert_eq!(defaulted.matches.len(), DEFAULT_LIMIT);

        let unspecified = engine.rank_profile(&profile, cv_text(), &vacancies, None);
        assert_eq!(unspecified.matches.len(), DEFAULT_LIMIT);
    }

    #[test]
    fn rank_skips_titleless_records() {
        let engine = MatchEngine::categorical(MatchTaxonomy::dutch_technical());
        let records = vec![
            serde_json::json!({ "bedrijf": "Naamloos" }),
            serde_json::json!({ "vacature": "Elektromonteur", "plaats": "Arnhem" }),
        ];

        let report = engine.rank(cv_text(), &records, None).expect("rank succeeds");
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.tier_counts.tier1, 1);
    }

    #[test]
    fn rank_rejects_short_cv() {
        let engine = MatchEngine::categorical(MatchTaxonomy::dutch_technical());
        let err = engine
            .rank("te kort", &[], None)
            .expect_err("short cv rejected");
        assert!(matches!(err, ExtractError::TextTooShort { .. }));
    }
}
