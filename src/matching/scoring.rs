use super::extractor::{CandidateProfile, LocationGuess};
use super::taxonomy::{MatchTaxonomy, RegionTier};
use super::vacancy::Vacancy;
use serde::Serialize;

/// Weighted blend applied to the categorical sub-scores. Title carries more
/// signal than location, and the weights always sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub title: f64,
    pub location: f64,
}

pub const CATEGORICAL_WEIGHTS: ScoreWeights = ScoreWeights {
    title: 0.6,
    location: 0.4,
};

/// Semantic path: cosine similarity carries this weight, with a keyword
/// bonus capped at the remainder.
pub const SEMANTIC_WEIGHT: f64 = 0.6;
pub const KEYWORD_BONUS_CAP: f64 = 0.4;
pub const TITLE_BONUS: f64 = 0.3;
pub const SKILL_OVERLAP_BONUS: f64 = 0.1;

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.title + self.location
    }
}

const DIRECT_TITLE_MATCH: u8 = 100;
const SAME_CATEGORY: u8 = 90;
const UNMATCHED_TITLE: u8 = 40;
const NO_VACANCY_LOCATION: u8 = 70;
const EXACT_CITY: u8 = 100;
const SAME_REGION: u8 = 90;
const ADJACENT_REGION: u8 = 75;
const DEFAULT_LOCATION: u8 = 50;

/// Discrete bucket derived from thresholding the total match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchTier {
    Tier1,
    Tier2,
    Tier3,
}

impl MatchTier {
    /// Fixed thresholds on the 0-100 scale, boundaries inclusive.
    pub const fn from_score(total: u8) -> Self {
        if total >= 80 {
            Self::Tier1
        } else if total >= 60 {
            Self::Tier2
        } else {
            Self::Tier3
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tier1 => "TIER1",
            Self::Tier2 => "TIER2",
            Self::Tier3 => "TIER3",
        }
    }
}

/// One scored candidate/vacancy pair with its sub-scores.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub vacancy: Vacancy,
    pub title_score: u8,
    pub location_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f32>,
    pub total_score: u8,
    pub tier: MatchTier,
}

/// Pure, total scorer: always returns a result for structurally valid input.
pub struct MatchScorer<'a> {
    taxonomy: &'a MatchTaxonomy,
    weights: ScoreWeights,
}

impl<'a> MatchScorer<'a> {
    pub fn new(taxonomy: &'a MatchTaxonomy) -> Self {
        Self {
            taxonomy,
            weights: CATEGORICAL_WEIGHTS,
        }
    }

    pub fn with_weights(taxonomy: &'a MatchTaxonomy, weights: ScoreWeights) -> Self {
        Self { taxonomy, weights }
    }

    /// Categorical title match via the shared taxonomy. A direct substring
    /// match either way wins outright; unmatched titles score a weak but
    /// non-zero baseline.
    pub fn title_score(&self, target_function: &str, vacancy_title: &str) -> u8 {
        let cv_lower = target_function.to_lowercase();
        let vac_lower = vacancy_title.to_lowercase();
        if !cv_lower.is_empty()
            && !vac_lower.is_empty()
            && (vac_lower.contains(&cv_lower) || cv_lower.contains(&vac_lower))
        {
            return DIRECT_TITLE_MATCH;
        }

        let cv_category = self.taxonomy.resolve_function(&cv_lower);
        let vac_category = self.taxonomy.resolve_function(&vac_lower);
        if let (Some(cv_cat), Some(vac_cat)) = (cv_category, vac_category) {
            if cv_cat.key == vac_cat.key {
                return SAME_CATEGORY;
            }
            if let Some(score) = self.taxonomy.related_score(cv_cat.key, vac_cat.key) {
                return score;
            }
        }

        UNMATCHED_TITLE
    }

    /// Geographic proximity tiers. Missing vacancy location data is neutral
    /// rather than penalized.
    pub fn location_score(&self, candidate: &LocationGuess, vacancy_location: &str) -> u8 {
        if vacancy_location.trim().is_empty() {
            return NO_VACANCY_LOCATION;
        }

        let vac_lower = vacancy_location.to_lowercase();
        let city_lower = candidate.city.to_lowercase();
        if candidate.region != RegionTier::Unknown
            && !city_lower.is_empty()
            && vac_lower.contains(&city_lower)
        {
            return EXACT_CITY;
        }

        if candidate.region == RegionTier::Primary {
            if self.taxonomy.regions.contains_primary(&vac_lower) {
                return SAME_REGION;
            }
            if self.taxonomy.regions.contains_adjacent(&vac_lower) {
                return ADJACENT_REGION;
            }
        }

        DEFAULT_LOCATION
    }

    /// Deterministic weighted blend of the categorical sub-scores.
    pub fn total_score(&self, title_score: u8, location_score: u8) -> u8 {
        let total =
            f64::from(title_score) * self.weights.title + f64::from(location_score) * self.weights.location;
        clamp_score(total)
    }

    /// Scores one candidate/vacancy pair on the categorical path.
    pub fn score(&self, profile: &CandidateProfile, vacancy: &Vacancy) -> MatchResult {
        let title_score = self.title_score(&profile.target_function, &vacancy.title);
        let location_score = self.location_score(&profile.location, &vacancy.location);
        let total_score = self.total_score(title_score, location_score);

        MatchResult {
            vacancy: vacancy.clone(),
            title_score,
            location_score,
            semantic_score: None,
            total_score,
            tier: MatchTier::from_score(total_score),
        }
    }

    /// Semantic-augmented total: embedding similarity in [0,1] blended with
    /// a capped keyword-overlap bonus, mapped onto the canonical 0-100 scale.
    pub fn semantic_total(
        &self,
        similarity: f32,
        profile: &CandidateProfile,
        cv_text_lower: &str,
        vacancy: &Vacancy,
    ) -> u8 {
        let mut bonus = 0.0;
        let function_lower = profile.target_function.to_lowercase();
        if !function_lower.is_empty() && vacancy.title.to_lowercase().contains(&function_lower) {
            bonus += TITLE_BONUS;
        }
        let overlap = vacancy
            .skills
            .iter()
            .filter(|skill| cv_text_lower.contains(&skill.to_lowercase()))
            .count();
        bonus += overlap as f64 * SKILL_OVERLAP_BONUS;

        let total = (f64::from(similarity) * SEMANTIC_WEIGHT + bonus.min(KEYWORD_BONUS_CAP)) * 100.0;
        clamp_score(total)
    }
}

fn clamp_score(value: f64) -> u8 {
    value.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::extractor::ProfileExtractor;

    fn taxonomy() -> MatchTaxonomy {
        MatchTaxonomy::dutch_technical()
    }

    fn location(city: &str, region: RegionTier) -> LocationGuess {
        LocationGuess {
            city: city.to_string(),
            region,
            confidence: 95,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        assert!((CATEGORICAL_WEIGHTS.sum() - 1.0).abs() < 1e-9);
        assert!((SEMANTIC_WEIGHT + KEYWORD_BONUS_CAP - 1.0).abs() < 1e-9);
    }

    #[test]
    fn direct_title_substring_scores_full() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        assert_eq!(scorer.title_score("Elektromonteur", "Elektromonteur"), 100);
        assert_eq!(
            scorer.title_score("Elektromonteur", "Senior Elektromonteur Industrie"),
            100
        );
    }

    #[test]
    fn same_category_scores_ninety() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        // "Elektricien" and "E-monteur" both resolve to elektromonteur but
        // neither is a substring of the other.
        assert_eq!(scorer.title_score("Elektricien", "E-monteur gezocht"), 90);
    }

    #[test]
    fn related_categories_use_affinity_table() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        // mechanic -> monteur, field service -> servicemonteur: related at 80.
        assert_eq!(scorer.title_score("Mechanic", "Field Service Technician"), 80);
        // electrical -> elektromonteur, mechanic -> monteur: related at 70.
        assert_eq!(scorer.title_score("Electrical", "Mechanic"), 70);
    }

    #[test]
    fn unmatched_titles_get_weak_baseline() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        assert_eq!(scorer.title_score("Verkoper", "Accountmanager"), 40);
        // Unrelated categories without an affinity entry also fall through.
        assert_eq!(scorer.title_score("Lasser", "Procesoperator"), 40);
    }

    #[test]
    fn missing_vacancy_location_is_neutral() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        let guess = location("Arnhem", RegionTier::Primary);
        assert_eq!(scorer.location_score(&guess, ""), 70);
        assert_eq!(scorer.location_score(&guess, "   "), 70);
    }

    #[test]
    fn exact_city_match_scores_full() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        let guess = location("Arnhem", RegionTier::Primary);
        assert_eq!(scorer.location_score(&guess, "Arnhem-Noord"), 100);
    }

    #[test]
    fn primary_region_tiers_apply() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        let guess = location("Arnhem", RegionTier::Primary);
        assert_eq!(scorer.location_score(&guess, "Nijmegen"), 90);
        assert_eq!(scorer.location_score(&guess, "Utrecht"), 75);
        assert_eq!(scorer.location_score(&guess, "Maastricht"), 50);
    }

    #[test]
    fn non_primary_candidate_gets_default_outside_city() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        let guess = location("Eindhoven", RegionTier::Metro);
        assert_eq!(scorer.location_score(&guess, "Arnhem"), 50);
    }

    #[test]
    fn total_blend_matches_expected_weighting() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        // 0.6 * 40 + 0.4 * 50 = 44
        assert_eq!(scorer.total_score(40, 50), 44);
        assert_eq!(scorer.total_score(100, 100), 100);
        assert_eq!(scorer.total_score(0, 0), 0);
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(MatchTier::from_score(100), MatchTier::Tier1);
        assert_eq!(MatchTier::from_score(80), MatchTier::Tier1);
        assert_eq!(MatchTier::from_score(79), MatchTier::Tier2);
        assert_eq!(MatchTier::from_score(60), MatchTier::Tier2);
        assert_eq!(MatchTier::from_score(59), MatchTier::Tier3);
        assert_eq!(MatchTier::from_score(0), MatchTier::Tier3);
    }

    #[test]
    fn semantic_total_stays_within_bounds() {
        let taxonomy = taxonomy();
        let scorer = MatchScorer::new(&taxonomy);
        let extractor = ProfileExtractor::new(&taxonomy);
        let profile = extractor
            .extract("Elektromonteur uit Arnhem met 8 jaar ervaring in laagspanning en kabel")
            .expect("profile extracts");

        let mut vacancy = Vacancy::samples().remove(0);
        vacancy.title = "Elektromonteur".to_string();
        vacancy.skills = vec!["laagspanning".to_string(), "kabel".to_string()];

        // Maximum similarity plus every bonus still clamps to 100.
        let high = scorer.semantic_total(1.0, &profile, "laagspanning kabel elektromonteur", &vacancy);
        assert_eq!(high, 100);

        let low = scorer.semantic_total(0.0, &profile, "geen overlap", &vacancy);
        assert!(low <= 100);
    }
}
