use clap::{Args, Parser, Subcommand};
use cv_matcher::config::{AppConfig, MatchingConfig};
use cv_matcher::error::AppError;
use cv_matcher::matching::{
    load_vacancies, HuggingFaceGateway, MatchEngine, MatchReport, MatchTaxonomy,
    NoopEmbeddingGateway, Vacancy,
};
use cv_matcher::{server, telemetry};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "CV Matcher",
    about = "Match candidate CVs against open vacancies from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Parse a CV text file into a candidate profile
    Parse(ParseArgs),
    /// Match a CV against a vacancy export and print the ranked results
    Match(MatchArgs),
    /// List the available vacancies, optionally filtered
    Vacancies(VacanciesArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Plain-text CV file
    #[arg(long)]
    cv: PathBuf,
    /// Emit the profile as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Plain-text CV file
    #[arg(long)]
    cv: PathBuf,
    /// Semicolon-delimited vacancy export (defaults to VACANCIES_CSV or the
    /// built-in samples)
    #[arg(long)]
    vacancies: Option<PathBuf>,
    /// Maximum number of matches to report
    #[arg(long)]
    limit: Option<usize>,
    /// Emit the report as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct VacanciesArgs {
    /// Semicolon-delimited vacancy export (defaults to VACANCIES_CSV or the
    /// built-in samples)
    #[arg(long)]
    vacancies: Option<PathBuf>,
    /// Only show vacancies whose location contains this text
    #[arg(long)]
    location: Option<String>,
    /// Only show vacancies with at least this minimum salary
    #[arg(long)]
    min_salary: Option<u32>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Parse(args) => run_parse(args),
        Command::Match(args) => run_match(args),
        Command::Vacancies(args) => run_vacancies(args),
    }
}

fn build_engine(matching: &MatchingConfig) -> Result<MatchEngine, AppError> {
    let taxonomy = MatchTaxonomy::dutch_technical();
    match &matching.hf_token {
        Some(token) => {
            let gateway = HuggingFaceGateway::new(token.clone(), &matching.hf_model)?;
            Ok(MatchEngine::new(taxonomy, Box::new(gateway)))
        }
        None => Ok(MatchEngine::new(taxonomy, Box::new(NoopEmbeddingGateway))),
    }
}

fn resolve_vacancies(
    override_path: Option<PathBuf>,
    matching: &MatchingConfig,
) -> Result<Vec<Vacancy>, AppError> {
    let path = override_path.or_else(|| matching.vacancies_csv.clone());
    match path {
        Some(path) => Ok(load_vacancies(path)?),
        None => Ok(Vacancy::samples()),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = Arc::new(build_engine(&config.matching)?);
    let (app, readiness) = server::build(engine);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);

    info!(?config.environment, %addr, "cv matcher service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = build_engine(&config.matching)?;

    let cv_text = std::fs::read_to_string(&args.cv)?;
    let profile = engine.extract_profile(&cv_text)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&profile).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Candidate profile");
    println!("Name:       {}", profile.name);
    println!(
        "Email:      {}",
        if profile.email.is_empty() {
            "-"
        } else {
            profile.email.as_str()
        }
    );
    println!(
        "Phone:      {}",
        if profile.phone.is_empty() {
            "-"
        } else {
            profile.phone.as_str()
        }
    );
    println!(
        "Location:   {} ({}, confidence {})",
        profile.location.city,
        profile.location.region.label(),
        profile.location.confidence
    );
    println!("Function:   {}", profile.target_function);
    println!("Experience: {} years", profile.experience_years);

    println!("\nSkill scores");
    for skill in &profile.skills.scores {
        println!("- {}: {}", skill.category, skill.score);
    }
    if let Some(primary) = &profile.skills.primary {
        println!("\nPrimary skill: {primary}");
    }

    Ok(())
}

fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = build_engine(&config.matching)?;

    let cv_text = std::fs::read_to_string(&args.cv)?;
    let profile = engine.extract_profile(&cv_text)?;
    let vacancies = resolve_vacancies(args.vacancies, &config.matching)?;

    let report = engine.rank_profile(&profile, &cv_text, &vacancies, args.limit);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
        return Ok(());
    }

    render_match_report(&report);
    Ok(())
}

fn run_vacancies(args: VacanciesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut vacancies = resolve_vacancies(args.vacancies, &config.matching)?;

    if let Some(location) = &args.location {
        let needle = location.to_lowercase();
        vacancies.retain(|v| v.location.to_lowercase().contains(&needle));
    }
    if let Some(min_salary) = args.min_salary {
        vacancies.retain(|v| v.salary_min >= min_salary);
    }

    println!("{} vacancies available", vacancies.len());
    for vacancy in &vacancies {
        println!("\n- {} @ {}", vacancy.title, vacancy.company);
        println!(
            "  {} | {} - {} EUR",
            vacancy.location, vacancy.salary_min, vacancy.salary_max
        );
        if !vacancy.contact_name.is_empty() {
            println!("  Contact: {} ({})", vacancy.contact_name, vacancy.contact_email);
        }
    }

    Ok(())
}

fn render_match_report(report: &MatchReport) {
    println!(
        "Matches for {} ({})",
        report.candidate_function, report.candidate_location.city
    );
    println!(
        "Scoring path: {}",
        match report.scoring_path {
            cv_matcher::matching::ScoringPath::Categorical => "categorical",
            cv_matcher::matching::ScoringPath::SemanticAugmented => "semantic-augmented",
        }
    );

    println!("\n#  Score Tier  Vacancy");
    for (index, result) in report.matches.iter().enumerate() {
        println!(
            "{:<2} {:>4} {:<5} {} @ {} ({})",
            index + 1,
            result.total_score,
            result.tier.label(),
            result.vacancy.title,
            result.vacancy.company,
            result.vacancy.location
        );
    }

    println!(
        "\nTier counts: {} TIER1, {} TIER2, {} TIER3",
        report.tier_counts.tier1, report.tier_counts.tier2, report.tier_counts.tier3
    );
}
