use super::taxonomy::{MatchTaxonomy, RegionTier};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Minimum amount of text the extractor will accept. Shorter inputs carry
/// too little signal to produce a usable profile.
pub const MIN_CV_LENGTH: usize = 50;

const NAME_SCAN_LINES: usize = 8;
const HEADER_NOISE: [&str; 5] = ["curriculum", "cv", "resume", "profiel", "pagina"];
const MAX_EXPERIENCE_YEARS: u8 = 40;
const DEFAULT_EXPERIENCE_YEARS: u8 = 5;
const SKILL_HIT_WEIGHT: u32 = 15;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("cv text is too short ({length} chars, minimum {minimum})")]
    TextTooShort { length: usize, minimum: usize },
}

/// Best-effort location guess with a confidence score on the 0-100 scale.
#[derive(Debug, Clone, Serialize)]
pub struct LocationGuess {
    pub city: String,
    pub region: RegionTier,
    pub confidence: u8,
}

impl LocationGuess {
    fn unknown() -> Self {
        Self {
            city: "Unknown".to_string(),
            region: RegionTier::Unknown,
            confidence: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillScore {
    pub category: String,
    pub score: u8,
}

/// Skill category scores sorted descending, ties keeping taxonomy order.
#[derive(Debug, Clone, Serialize)]
pub struct SkillAssessment {
    pub scores: Vec<SkillScore>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub top: Vec<String>,
}

/// Structured candidate attributes extracted from free CV text. Every field
/// has a documented fallback; extraction never fails on malformed content.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: LocationGuess,
    pub target_function: String,
    pub experience_years: u8,
    pub skills: SkillAssessment,
}

/// Pulls a [`CandidateProfile`] out of unstructured CV text using the
/// injected taxonomy tables.
pub struct ProfileExtractor<'a> {
    taxonomy: &'a MatchTaxonomy,
}

impl<'a> ProfileExtractor<'a> {
    pub fn new(taxonomy: &'a MatchTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn extract(&self, text: &str) -> Result<CandidateProfile, ExtractError> {
        let trimmed = text.trim();
        if trimmed.len() < MIN_CV_LENGTH {
            return Err(ExtractError::TextTooShort {
                length: trimmed.len(),
                minimum: MIN_CV_LENGTH,
            });
        }

        let text_lower = trimmed.to_lowercase();

        Ok(CandidateProfile {
            name: extract_name(trimmed),
            email: extract_email(trimmed),
            phone: extract_phone(trimmed),
            location: self.extract_location(&text_lower),
            target_function: self.extract_function(&text_lower),
            experience_years: extract_years(&text_lower, trimmed),
            skills: self.extract_skills(&text_lower),
        })
    }

    fn extract_location(&self, text_lower: &str) -> LocationGuess {
        let regions = &self.taxonomy.regions;
        let tiers = [
            (regions.primary, RegionTier::Primary, 95),
            (regions.adjacent, RegionTier::Adjacent, 80),
            (regions.metro, RegionTier::Metro, 60),
        ];

        for (cities, region, confidence) in tiers {
            if let Some(city) = cities.iter().find(|city| text_lower.contains(*city)) {
                return LocationGuess {
                    city: title_case(city),
                    region,
                    confidence,
                };
            }
        }

        LocationGuess::unknown()
    }

    fn extract_function(&self, text_lower: &str) -> String {
        self.taxonomy
            .resolve_function(text_lower)
            .map(|category| category.label.to_string())
            .unwrap_or_else(|| self.taxonomy.fallback_function.to_string())
    }

    fn extract_skills(&self, text_lower: &str) -> SkillAssessment {
        let mut scores: Vec<SkillScore> = self
            .taxonomy
            .skills
            .iter()
            .map(|category| {
                let hits = category
                    .keywords
                    .iter()
                    .filter(|kw| text_lower.contains(*kw))
                    .count() as u32;
                SkillScore {
                    category: category.key.to_string(),
                    score: (hits * SKILL_HIT_WEIGHT).min(100) as u8,
                }
            })
            .collect();

        // Stable sort: equal scores keep taxonomy declaration order.
        scores.sort_by(|a, b| b.score.cmp(&a.score));

        let primary = scores
            .first()
            .filter(|s| s.score > 0)
            .map(|s| s.category.clone());
        let secondary = scores
            .get(1)
            .filter(|s| s.score > 0)
            .map(|s| s.category.clone());
        let top = scores
            .iter()
            .filter(|s| s.score > 0)
            .take(3)
            .map(|s| s.category.clone())
            .collect();

        SkillAssessment {
            scores,
            primary,
            secondary,
            top,
        }
    }
}

fn extract_name(text: &str) -> String {
    for line in text.lines().take(NAME_SCAN_LINES) {
        let line = line.trim();
        if line.len() < 4 {
            continue;
        }
        let line_lower = line.to_lowercase();
        if HEADER_NOISE.iter().any(|noise| line_lower.contains(noise)) {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if !(2..=4).contains(&words.len()) {
            continue;
        }
        let alpha_words: Vec<&str> = words
            .iter()
            .copied()
            .filter(|word| {
                let stripped: String = word
                    .chars()
                    .filter(|c| !matches!(c, '-' | '\'' | '.'))
                    .collect();
                !stripped.is_empty() && stripped.chars().all(char::is_alphabetic)
            })
            .collect();
        if alpha_words.len() >= 2 {
            return alpha_words.join(" ");
        }
    }
    "Unknown".to_string()
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email pattern")
    })
}

fn extract_email(text: &str) -> String {
    email_regex()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn phone_regexes() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"06[-\s]?\d{2}[-\s]?\d{2}[-\s]?\d{2}[-\s]?\d{2}")
                .expect("valid phone pattern"),
            Regex::new(r"06[-\s]?\d{8}").expect("valid phone pattern"),
            Regex::new(r"\+31[-\s]?6[-\s]?\d{8}").expect("valid phone pattern"),
        ]
    })
}

fn extract_phone(text: &str) -> String {
    for pattern in phone_regexes() {
        if let Some(m) = pattern.find(text) {
            return m
                .as_str()
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '-')
                .collect();
        }
    }
    String::new()
}

fn experience_regexes() -> &'static [Regex; 2] {
    static RES: OnceLock<[Regex; 2]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"(\d+)\+?\s*jaar\s*ervaring").expect("valid experience pattern"),
            Regex::new(r"(\d+)\+?\s*years?\s*experience").expect("valid experience pattern"),
        ]
    })
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(19[89]\d|20[0-2]\d)").expect("valid year pattern"))
}

fn extract_years(text_lower: &str, text: &str) -> u8 {
    for pattern in experience_regexes() {
        if let Some(caps) = pattern.captures(text_lower) {
            if let Ok(years) = caps[1].parse::<u32>() {
                return years.min(MAX_EXPERIENCE_YEARS as u32) as u8;
            }
        }
    }

    // Fall back to the span between the earliest and latest plausible year.
    let years: Vec<u32> = year_regex()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if years.len() >= 2 {
        let min = years.iter().min().copied().unwrap_or_default();
        let max = years.iter().max().copied().unwrap_or_default();
        if min < max {
            return (max - min).min(MAX_EXPERIENCE_YEARS as u32) as u8;
        }
    }

    DEFAULT_EXPERIENCE_YEARS
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
