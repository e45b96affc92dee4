use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use matric_link::catalog::{load_catalog, write_catalog, Catalog, Institution, InstitutionType, SubjectKey};
use matric_link::config::{Config, ConfigOverrides};
use matric_link::eligibility::evaluator::lookup_mark;
use matric_link::eligibility::gaps::{collect_gaps, near_misses};
use matric_link::eligibility::history::{record_from_result, summarize_timeline};
use matric_link::eligibility::scoring::{MatchScorer, PlaceholderScorer};
use matric_link::eligibility::MatchResult;
use matric_link::output::csv::{gaps_to_csv, recommendations_to_csv};
use matric_link::output::table::{
    render_applications_table, render_courses_table, render_gaps_table, render_history_table,
    render_institutions_table, render_recommendations_table,
};
use matric_link::output::{render_json, OutputFormat};
use matric_link::profile::{check_profile, AcademicProfile};
use matric_link::recommend::{
    build_recommendations, days_until_nearest_deadline, filter_by_min_score,
    filter_institutions_by_type, match_institutions, recommended_deadlines, search_courses,
    search_institutions,
};
use matric_link::session::store::SessionStore;
use matric_link::session::{ApplicationStatus, SessionContext};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "matric-link",
    about = "Match matric results against course and institution requirements"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(short, long)]
    student: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Seed for reproducible placeholder match scores.
    #[arg(long)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check a results file without saving it.
    Validate { file: PathBuf },
    /// Save results and generate recommendations.
    Submit { file: PathBuf },
    Status {
        #[arg(long)]
        min_score: Option<u8>,
        /// Re-evaluate instead of showing saved recommendations.
        #[arg(long)]
        refresh: bool,
    },
    Gaps {
        /// Only courses missed by at most the configured margin.
        #[arg(long)]
        near_miss: bool,
    },
    Courses {
        #[arg(long, default_value = "")]
        search: String,
    },
    Institutions {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long = "type", value_delimiter = ',')]
        types: Vec<String>,
        /// Filter by the institution types saved with the results.
        #[arg(long)]
        preferred: bool,
    },
    Apply {
        #[arg(long, conflicts_with = "institution")]
        course: Option<u32>,
        #[arg(long)]
        institution: Option<String>,
    },
    Applications,
    /// Move an application to its next status, or to --status.
    Advance {
        id: i64,
        #[arg(long)]
        status: Option<String>,
    },
    Profile,
    History {
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long)]
        course: Option<u32>,
    },
    Catalog {
        /// Write the active catalog as JSON for editing.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Serialize)]
struct ProfileSummary {
    student: Option<String>,
    subjects: usize,
    average_mark: Option<i32>,
    mathematics: i32,
    completion_percent: u8,
    applications: usize,
    days_until_deadline: i64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let min_score = match &cli.command {
        Commands::Status { min_score, .. } => *min_score,
        _ => None,
    };
    config.apply_overrides(ConfigOverrides {
        student: cli.student.clone(),
        catalog_path: cli.catalog.clone(),
        min_score,
    });

    if let Commands::Config { init, show } = &cli.command {
        return handle_config_command(*init, *show, &config, &config_path);
    }

    if let Commands::Validate { file } = &cli.command {
        let profile = AcademicProfile::load(file)?;
        return match check_profile(&profile) {
            Ok(()) => {
                println!("Results are valid ({} subjects).", profile.subjects.len());
                Ok(())
            }
            Err(issue) => Err(issue.into()),
        };
    }

    let catalog = load_catalog(config.resolved_catalog_path().as_deref())?;
    let mut scorer = match cli.seed {
        Some(seed) => PlaceholderScorer::seeded(
            seed,
            config.matching.score_floor,
            config.matching.score_ceiling,
        ),
        None => PlaceholderScorer::new(config.matching.score_floor, config.matching.score_ceiling),
    };

    if let Commands::Catalog { export } = &cli.command {
        return handle_catalog_command(&catalog, export.as_deref(), cli.output);
    }

    let store = SessionStore::open(&config.resolved_db_path())?;
    let mut session = store.load_session()?;
    if let Some(student) = config.student_name() {
        session.student = Some(student);
    }

    match &cli.command {
        Commands::Submit { file } => {
            let profile = AcademicProfile::load(file)?;
            if let Err(issue) = check_profile(&profile) {
                warn!("rejected results from {}: {issue}", file.display());
                return Err(issue.into());
            }
            session.submit_profile(profile);
            let results = refresh_recommendations(&mut session, &catalog, &mut scorer, &store)?;
            store.save_session(&session)?;
            info!(courses = results.len(), "results submitted");
            print_recommendations(&results, cli.output)?;
        }
        Commands::Status { refresh, .. } => {
            if *refresh || session.recommendations.is_empty() {
                refresh_recommendations(&mut session, &catalog, &mut scorer, &store)?;
                store.save_session(&session)?;
            }
            let filtered = filter_by_min_score(&session.recommendations, config.matching.min_score);
            print_recommendations(&filtered, cli.output)?;
        }
        Commands::Gaps { near_miss } => {
            if session.recommendations.is_empty() {
                refresh_recommendations(&mut session, &catalog, &mut scorer, &store)?;
                store.save_session(&session)?;
            }
            if *near_miss {
                let close: Vec<MatchResult> =
                    near_misses(&session.recommendations, config.matching.near_miss_margin)
                        .into_iter()
                        .cloned()
                        .collect();
                print_recommendations(&close, cli.output)?;
            } else {
                let gaps = collect_gaps(&session.recommendations);
                match cli.output {
                    OutputFormat::Table => println!("{}", render_gaps_table(&gaps)),
                    OutputFormat::Json => println!("{}", render_json(&gaps)?),
                    OutputFormat::Csv => println!("{}", gaps_to_csv(&gaps)?),
                }
            }
        }
        Commands::Courses { search } => {
            let courses = search_courses(&catalog.courses, search);
            match cli.output {
                OutputFormat::Table => println!("{}", render_courses_table(&courses)),
                OutputFormat::Json => println!("{}", render_json(&courses)?),
                OutputFormat::Csv => {
                    warn!("CSV output for courses not implemented, using JSON");
                    println!("{}", render_json(&courses)?);
                }
            }
        }
        Commands::Institutions {
            search,
            types,
            preferred,
        } => {
            let mut selected_types = parse_institution_types(types)?;
            if *preferred {
                if let Some(profile) = &session.profile {
                    selected_types.extend(profile.institution_types.iter().copied());
                }
            }
            let found = search_institutions(&catalog.institutions, search);
            let filtered = filter_institutions_by_type(&found, &selected_types);
            let profile = session.profile.clone().unwrap_or_default();
            let matches = match_institutions(&filtered, &profile);
            match cli.output {
                OutputFormat::Table => {
                    let rows: Vec<(&Institution, _)> = filtered.into_iter().zip(matches).collect();
                    println!("{}", render_institutions_table(&rows));
                }
                OutputFormat::Json => println!("{}", render_json(&matches)?),
                OutputFormat::Csv => {
                    warn!("CSV output for institutions not implemented, using JSON");
                    println!("{}", render_json(&matches)?);
                }
            }
        }
        Commands::Apply {
            course,
            institution,
        } => {
            let before = session.applications.len();
            let application = match (course, institution) {
                (Some(id), _) => {
                    let course = catalog
                        .course(*id)
                        .ok_or_else(|| anyhow!("unknown course id: {id}"))?;
                    session.start_course_application(course).clone()
                }
                (None, Some(id)) => {
                    let institution = catalog
                        .institution(id)
                        .ok_or_else(|| anyhow!("unknown institution id: {id}"))?;
                    session.start_institution_application(institution).clone()
                }
                (None, None) => bail!("either --course or --institution is required"),
            };
            store.save_session(&session)?;
            if session.applications.len() > before {
                info!(id = application.id, "application started");
                println!("Application started for {}!", application.target.label());
            } else {
                println!(
                    "Already applying to {} (application {}, {}).",
                    application.target.label(),
                    application.id,
                    application.status
                );
            }
        }
        Commands::Advance { id, status } => {
            let status = status
                .as_deref()
                .map(ApplicationStatus::from_str)
                .transpose()?;
            let application = session.advance_application(*id, status)?.clone();
            store.save_session(&session)?;
            info!(id = application.id, status = %application.status, "application updated");
            println!(
                "{} is now {} ({}%).",
                application.target.label(),
                application.status,
                application.progress()
            );
        }
        Commands::Applications => match cli.output {
            OutputFormat::Table => println!("{}", render_applications_table(&session.applications)),
            OutputFormat::Json | OutputFormat::Csv => {
                println!("{}", render_json(&session.applications)?)
            }
        },
        Commands::Profile => {
            let summary = summarize_profile(&session, &catalog);
            match cli.output {
                OutputFormat::Table => print_profile_summary(&summary),
                OutputFormat::Json | OutputFormat::Csv => println!("{}", render_json(&summary)?),
            }
        }
        Commands::History { limit, course } => {
            let history = store.load_history(*course, *limit)?;
            let summary = summarize_timeline(&history, *course);
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_history_table(&history));
                    println!("{summary}");
                }
                OutputFormat::Json => println!("{}", render_json(&history)?),
                OutputFormat::Csv => {
                    warn!("CSV output for history not implemented, using JSON");
                    println!("{}", render_json(&history)?);
                }
            }
        }
        Commands::Validate { .. } | Commands::Catalog { .. } | Commands::Config { .. } => {
            unreachable!("handled before the session store is opened")
        }
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn handle_catalog_command(catalog: &Catalog, export: Option<&Path>, format: OutputFormat) -> Result<()> {
    if let Some(path) = export {
        write_catalog(path, catalog)?;
        println!("Wrote catalog to {}", path.display());
        return Ok(());
    }
    match format {
        OutputFormat::Table => {
            let courses: Vec<_> = catalog.courses.iter().collect();
            println!("{}", render_courses_table(&courses));
            println!("Catalog fingerprint: {}", catalog.fingerprint);
        }
        OutputFormat::Json | OutputFormat::Csv => println!("{}", render_json(catalog)?),
    }
    Ok(())
}

fn refresh_recommendations(
    session: &mut SessionContext,
    catalog: &Catalog,
    scorer: &mut dyn MatchScorer,
    store: &SessionStore,
) -> Result<Vec<MatchResult>> {
    let Some(profile) = &session.profile else {
        bail!("no results submitted yet; run `matric-link submit <file>` first");
    };
    let results = build_recommendations(catalog, profile, scorer);
    for result in &results {
        store.insert_match_record(&record_from_result(&catalog.fingerprint, result))?;
    }
    session.set_recommendations(results.clone());
    Ok(results)
}

fn parse_institution_types(raw: &[String]) -> Result<Vec<InstitutionType>> {
    let mut out = Vec::new();
    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push(InstitutionType::from_str(trimmed)?);
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn summarize_profile(session: &SessionContext, catalog: &Catalog) -> ProfileSummary {
    let profile = session.profile.clone().unwrap_or_default();
    let today = Utc::now().date_naive();
    ProfileSummary {
        student: session.student.clone(),
        subjects: profile.subjects.len(),
        average_mark: profile.average_mark(),
        mathematics: lookup_mark(&profile, &SubjectKey::Mathematics),
        completion_percent: session.profile_completion(),
        applications: session.applications.len(),
        days_until_deadline: days_until_nearest_deadline(
            recommended_deadlines(catalog, &session.recommendations),
            today,
        ),
    }
}

fn print_profile_summary(summary: &ProfileSummary) {
    println!(
        "Student: {}",
        summary.student.as_deref().unwrap_or("(not set)")
    );
    println!("Subjects submitted: {}", summary.subjects);
    match summary.average_mark {
        Some(avg) => println!("Academic average: {avg}%"),
        None => println!("Academic average: -"),
    }
    println!("Mathematics: {}%", summary.mathematics);
    println!("Profile completion: {}%", summary.completion_percent);
    println!("Applications: {}", summary.applications);
    println!("Days until nearest deadline: {}", summary.days_until_deadline);
}

fn print_recommendations(results: &[MatchResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_recommendations_table(results)),
        OutputFormat::Json => println!("{}", render_json(results)?),
        OutputFormat::Csv => println!("{}", recommendations_to_csv(results)?),
    }
    Ok(())
}
