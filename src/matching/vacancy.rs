use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Canonical vacancy shape, regardless of which naming convention the
/// source record used. Read-only to the matching core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vacancy {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub skills: Vec<String>,
    pub salary_min: u32,
    pub salary_max: u32,
    pub contact_name: String,
    pub contact_email: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum VacancySourceError {
    #[error("failed to read vacancy export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid vacancy CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Accepted source key aliases, declared up front. Both observed naming
/// conventions (lower-case Dutch and capitalized export headers) resolve to
/// the same canonical field.
const TITLE_KEYS: [&str; 5] = ["vacature", "Vacature", "functietitel", "titel", "title"];
const COMPANY_KEYS: [&str; 5] = [
    "bedrijf",
    "Bedrijfsnaam",
    "bedrijfsnaam",
    "company",
    "Bedrijf",
];
const LOCATION_KEYS: [&str; 5] = ["plaats", "Plaats", "locatie", "Locatie", "location"];
const ID_KEYS: [&str; 2] = ["id", "Id"];
const SKILLS_KEYS: [&str; 2] = ["skills", "Skills"];
const SALARY_MIN_KEYS: [&str; 2] = ["salaris_min", "salary_min"];
const SALARY_MAX_KEYS: [&str; 2] = ["salaris_max", "salary_max"];
const CONTACT_NAME_KEYS: [&str; 2] = ["contact_naam", "contact_name"];
const CONTACT_EMAIL_KEYS: [&str; 2] = ["contact_email", "Contact_email"];
const URL_KEYS: [&str; 3] = ["vacature_url", "url", "Url"];

impl Vacancy {
    /// Maps a heterogeneous record onto the canonical shape. Returns `None`
    /// when the resolved title is empty; a title-less vacancy cannot be
    /// scored and is skipped rather than failing the batch.
    pub fn from_record(record: &Value) -> Option<Self> {
        let title = string_field(record, &TITLE_KEYS);
        if title.is_empty() {
            debug!("skipping vacancy record without a resolvable title");
            return None;
        }

        Some(Self {
            id: string_field(record, &ID_KEYS),
            title,
            company: string_field(record, &COMPANY_KEYS),
            location: string_field(record, &LOCATION_KEYS),
            skills: skills_field(record),
            salary_min: numeric_field(record, &SALARY_MIN_KEYS),
            salary_max: numeric_field(record, &SALARY_MAX_KEYS),
            contact_name: string_field(record, &CONTACT_NAME_KEYS),
            contact_email: string_field(record, &CONTACT_EMAIL_KEYS),
            url: string_field(record, &URL_KEYS),
        })
    }

    /// Free text used for the batched embedding call.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title,
            self.company,
            self.skills.join(" "),
            self.location
        )
    }

    /// Built-in demo vacancies used when no CSV export is configured.
    pub fn samples() -> Vec<Self> {
        let sample = |id: &str,
                      title: &str,
                      company: &str,
                      location: &str,
                      skills: &[&str],
                      salary_min: u32,
                      salary_max: u32,
                      contact_name: &str,
                      contact_email: &str,
                      url: &str| Vacancy {
            id: id.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            salary_min,
            salary_max,
            contact_name: contact_name.to_string(),
            contact_email: contact_email.to_string(),
            url: url.to_string(),
        };

        vec![
            sample(
                "1",
                "Ploegleider Productie",
                "ASML",
                "Veldhoven",
                &["leiderschap", "productie", "lean"],
                55_000,
                70_000,
                "Sandra Vermeulen",
                "s.vermeulen@asml.com",
                "https://asml.com/jobs/1",
            ),
            sample(
                "2",
                "Teamleider Assemblage",
                "Philips",
                "Eindhoven",
                &["teamleider", "assemblage", "kwaliteit"],
                50_000,
                65_000,
                "Marc de Jong",
                "m.dejong@philips.com",
                "https://philips.com/jobs/2",
            ),
            sample(
                "3",
                "Production Supervisor",
                "VDL",
                "Eindhoven",
                &["supervisor", "manufacturing"],
                48_000,
                60_000,
                "Lisa Peters",
                "l.peters@vdl.nl",
                "https://vdl.nl/jobs/3",
            ),
            sample(
                "4",
                "Process Engineer",
                "ASML",
                "Veldhoven",
                &["engineer", "lean", "six-sigma"],
                60_000,
                80_000,
                "Tom Bakker",
                "t.bakker@asml.com",
                "https://asml.com/jobs/4",
            ),
            sample(
                "5",
                "Operations Manager",
                "Vanderlande",
                "Veghel",
                &["operations", "lean", "management"],
                65_000,
                85_000,
                "Erik Mulder",
                "e.mulder@vanderlande.com",
                "https://vanderlande.com/jobs/5",
            ),
        ]
    }
}

/// Normalizes a batch of heterogeneous records, silently dropping the ones
/// that cannot be scored. One bad record never fails the batch.
pub fn normalize_records(records: &[Value]) -> Vec<Vacancy> {
    records.iter().filter_map(Vacancy::from_record).collect()
}

fn string_field(record: &Value, keys: &[&str]) -> String {
    for key in keys {
        match record.get(key) {
            Some(Value::String(value)) => {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
            Some(Value::Number(value)) => return value.to_string(),
            _ => {}
        }
    }
    String::new()
}

fn numeric_field(record: &Value, keys: &[&str]) -> u32 {
    for key in keys {
        match record.get(key) {
            Some(Value::Number(value)) => {
                if let Some(number) = value.as_u64() {
                    return number.min(u32::MAX as u64) as u32;
                }
            }
            Some(Value::String(value)) => {
                if let Ok(number) = value.trim().parse::<u32>() {
                    return number;
                }
            }
            _ => {}
        }
    }
    0
}

fn skills_field(record: &Value) -> Vec<String> {
    for key in SKILLS_KEYS {
        match record.get(key) {
            Some(Value::Array(items)) => {
                return items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            Some(Value::String(joined)) => {
                return joined
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }
    Vec::new()
}

#[derive(Debug, Deserialize)]
struct VacancyRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    functietitel: String,
    #[serde(default)]
    bedrijfsnaam: String,
    #[serde(default)]
    locatie: String,
    #[serde(default)]
    skills: String,
    #[serde(default)]
    salaris_min: Option<u32>,
    #[serde(default)]
    salaris_max: Option<u32>,
    #[serde(default)]
    contact_voornaam: String,
    #[serde(default)]
    contact_achternaam: String,
    #[serde(default)]
    contact_email: String,
    #[serde(default)]
    vacature_url: String,
}

impl VacancyRow {
    fn into_vacancy(self) -> Option<Vacancy> {
        if self.functietitel.trim().is_empty() {
            return None;
        }
        let contact_name = format!("{} {}", self.contact_voornaam, self.contact_achternaam)
            .trim()
            .to_string();
        Some(Vacancy {
            id: self.id,
            title: self.functietitel,
            company: self.bedrijfsnaam,
            location: self.locatie,
            skills: self
                .skills
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            salary_min: self.salaris_min.unwrap_or(0),
            salary_max: self.salaris_max.unwrap_or(0),
            contact_name,
            contact_email: self.contact_email,
            url: self.vacature_url,
        })
    }
}

/// Reads a semicolon-delimited vacancy export.
pub fn read_vacancies<R: Read>(reader: R) -> Result<Vec<Vacancy>, VacancySourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut vacancies = Vec::new();
    for record in csv_reader.deserialize::<VacancyRow>() {
        if let Some(vacancy) = record?.into_vacancy() {
            vacancies.push(vacancy);
        }
    }
    Ok(vacancies)
}

pub fn load_vacancies(path: impl AsRef<Path>) -> Result<Vec<Vacancy>, VacancySourceError> {
    let file = std::fs::File::open(path)?;
    read_vacancies(file)
}
