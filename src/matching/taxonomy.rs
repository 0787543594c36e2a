use serde::Serialize;

/// Discrete proximity classification of a city relative to the agency's
/// primary service area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionTier {
    Primary,
    Adjacent,
    Metro,
    Unknown,
}

impl RegionTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "Gelderland",
            Self::Adjacent => "Adjacent",
            Self::Metro => "Randstad",
            Self::Unknown => "Unknown",
        }
    }
}

/// A canonical job-function category and the synonym keywords that map
/// free text onto it. Declaration order is significant: the first category
/// whose keyword matches wins, and ties in skill scoring are broken by it.
#[derive(Debug, Clone)]
pub struct FunctionCategory {
    pub key: &'static str,
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct SkillCategory {
    pub key: &'static str,
    pub keywords: &'static [&'static str],
}

/// Affinity between two distinct function categories. The pair is stored
/// pre-sorted alphabetically so lookups canonicalize the same way.
#[derive(Debug, Clone, Copy)]
pub struct RelatedPair {
    pub first: &'static str,
    pub second: &'static str,
    pub score: u8,
}

#[derive(Debug, Clone)]
pub struct RegionTable {
    pub primary: &'static [&'static str],
    pub adjacent: &'static [&'static str],
    pub metro: &'static [&'static str],
}

impl RegionTable {
    pub fn contains_primary(&self, text: &str) -> bool {
        self.primary.iter().any(|city| text.contains(city))
    }

    pub fn contains_adjacent(&self, text: &str) -> bool {
        self.adjacent.iter().any(|city| text.contains(city))
    }
}

/// Declarative lookup tables driving extraction and scoring. Constructed once
/// and passed into each component so alternate taxonomies can be substituted.
#[derive(Debug, Clone)]
pub struct MatchTaxonomy {
    pub functions: Vec<FunctionCategory>,
    pub skills: Vec<SkillCategory>,
    pub related: Vec<RelatedPair>,
    pub regions: RegionTable,
    pub fallback_function: &'static str,
}

impl MatchTaxonomy {
    /// The agency's standard taxonomy for Dutch technical recruitment.
    pub fn dutch_technical() -> Self {
        Self {
            functions: vec![
                FunctionCategory {
                    key: "elektromonteur",
                    label: "Elektromonteur",
                    keywords: &[
                        "elektromonteur",
                        "e-monteur",
                        "elektrisch monteur",
                        "elektricien",
                        "e&i monteur",
                        "electrical",
                    ],
                },
                FunctionCategory {
                    key: "servicemonteur",
                    label: "Servicemonteur",
                    keywords: &[
                        "servicemonteur",
                        "service engineer",
                        "field service",
                        "buitendienstmonteur",
                        "storingsmonteur",
                    ],
                },
                FunctionCategory {
                    key: "werkvoorbereider",
                    label: "Werkvoorbereider",
                    keywords: &[
                        "werkvoorbereider",
                        "werkvoorbereiding",
                        "work planner",
                        "technisch planner",
                    ],
                },
                FunctionCategory {
                    key: "projectleider",
                    label: "Projectleider",
                    keywords: &[
                        "projectleider",
                        "project manager",
                        "projectmanager",
                        "uitvoerder",
                        "project lead",
                    ],
                },
                FunctionCategory {
                    key: "monteur",
                    label: "Monteur",
                    keywords: &[
                        "monteur",
                        "technicus",
                        "mechanic",
                        "fitter",
                        "mechanisch monteur",
                    ],
                },
                FunctionCategory {
                    key: "engineer",
                    label: "Engineer",
                    keywords: &[
                        "engineer",
                        "ingenieur",
                        "technisch specialist",
                        "design engineer",
                    ],
                },
                FunctionCategory {
                    key: "operator",
                    label: "Operator",
                    keywords: &[
                        "operator",
                        "machinist",
                        "procesoperator",
                        "productiemedewerker",
                    ],
                },
                FunctionCategory {
                    key: "lasser",
                    label: "Lasser",
                    keywords: &["lasser", "welder", "constructiebankwerker", "pijpfitter"],
                },
                FunctionCategory {
                    key: "cnc",
                    label: "Cnc",
                    keywords: &["cnc", "draaier", "frezer", "verspaner", "cnc operator"],
                },
                FunctionCategory {
                    key: "plc",
                    label: "Plc",
                    keywords: &[
                        "plc",
                        "programmeur",
                        "automatisering",
                        "software engineer",
                        "controls",
                    ],
                },
            ],
            skills: vec![
                SkillCategory {
                    key: "elektro",
                    keywords: &[
                        "elektro",
                        "elektrisch",
                        "e&i",
                        "laagspanning",
                        "hoogspanning",
                        "schakelaar",
                        "kabel",
                        "installatie",
                    ],
                },
                SkillCategory {
                    key: "mechanisch",
                    keywords: &[
                        "mechanisch",
                        "montage",
                        "onderhoud",
                        "hydrauliek",
                        "pneumatiek",
                        "lagers",
                        "aandrijving",
                    ],
                },
                SkillCategory {
                    key: "lassen",
                    keywords: &[
                        "lassen", "tig", "mig", "mag", "elektrode", "constructie", "staal", "rvs",
                    ],
                },
                SkillCategory {
                    key: "plc",
                    keywords: &[
                        "plc",
                        "siemens",
                        "allen bradley",
                        "tia portal",
                        "step 7",
                        "scada",
                        "hmi",
                        "programmeren",
                    ],
                },
                SkillCategory {
                    key: "service",
                    keywords: &[
                        "storing",
                        "service",
                        "onderhoud",
                        "reparatie",
                        "diagnose",
                        "troubleshoot",
                    ],
                },
                SkillCategory {
                    key: "projecten",
                    keywords: &[
                        "project",
                        "planning",
                        "coordinatie",
                        "aansturing",
                        "oplevering",
                        "budget",
                    ],
                },
                SkillCategory {
                    key: "proces",
                    keywords: &[
                        "proces", "productie", "operator", "batch", "continu", "kwaliteit",
                    ],
                },
                SkillCategory {
                    key: "technisch_tekenen",
                    keywords: &[
                        "autocad",
                        "solidworks",
                        "inventor",
                        "tekening",
                        "cad",
                        "3d",
                        "engineering",
                    ],
                },
            ],
            related: vec![
                RelatedPair {
                    first: "elektromonteur",
                    second: "monteur",
                    score: 70,
                },
                RelatedPair {
                    first: "elektromonteur",
                    second: "servicemonteur",
                    score: 75,
                },
                RelatedPair {
                    first: "monteur",
                    second: "servicemonteur",
                    score: 80,
                },
            ],
            regions: RegionTable {
                primary: &[
                    "arnhem",
                    "nijmegen",
                    "apeldoorn",
                    "ede",
                    "doetinchem",
                    "harderwijk",
                    "ermelo",
                    "tiel",
                    "wageningen",
                    "barneveld",
                    "zutphen",
                    "nijkerk",
                    "velp",
                    "zevenaar",
                    "winterswijk",
                    "culemborg",
                    "elburg",
                    "putten",
                    "nunspeet",
                    "hattem",
                    "elst",
                    "bemmel",
                    "duiven",
                    "westervoort",
                ],
                adjacent: &[
                    "almere",
                    "amersfoort",
                    "utrecht",
                    "hilversum",
                    "deventer",
                    "zwolle",
                    "bunschoten",
                    "leusden",
                    "veenendaal",
                    "rhenen",
                    "houten",
                    "nieuwegein",
                ],
                metro: &[
                    "amsterdam",
                    "rotterdam",
                    "den haag",
                    "eindhoven",
                    "tilburg",
                ],
            },
            fallback_function: "Technisch",
        }
    }

    /// First function category (in declaration order) with a synonym that is
    /// a substring of the lower-cased text.
    pub fn resolve_function(&self, text_lower: &str) -> Option<&FunctionCategory> {
        self.functions
            .iter()
            .find(|category| category.keywords.iter().any(|kw| text_lower.contains(kw)))
    }

    pub fn related_score(&self, a: &str, b: &str) -> Option<u8> {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        self.related
            .iter()
            .find(|pair| pair.first == first && pair.second == second)
            .map(|pair| pair.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_pairs_are_stored_sorted() {
        let taxonomy = MatchTaxonomy::dutch_technical();
        for pair in &taxonomy.related {
            assert!(
                pair.first < pair.second,
                "pair ({}, {}) not alphabetically sorted",
                pair.first,
                pair.second
            );
        }
    }

    #[test]
    fn related_lookup_is_symmetric() {
        let taxonomy = MatchTaxonomy::dutch_technical();
        assert_eq!(taxonomy.related_score("monteur", "elektromonteur"), Some(70));
        assert_eq!(taxonomy.related_score("elektromonteur", "monteur"), Some(70));
        assert_eq!(taxonomy.related_score("lasser", "cnc"), None);
    }

    #[test]
    fn resolve_function_honors_declaration_order() {
        let taxonomy = MatchTaxonomy::dutch_technical();
        // "servicemonteur" also contains "monteur"; the earlier category wins.
        let category = taxonomy
            .resolve_function("ervaren servicemonteur gezocht")
            .expect("category resolves");
        assert_eq!(category.key, "servicemonteur");
    }

    #[test]
    fn region_table_covers_all_tiers() {
        let taxonomy = MatchTaxonomy::dutch_technical();
        assert!(taxonomy.regions.contains_primary("werkzaam in arnhem"));
        assert!(taxonomy.regions.contains_adjacent("regio utrecht"));
        assert!(taxonomy.regions.metro.contains(&"rotterdam"));
    }
}
