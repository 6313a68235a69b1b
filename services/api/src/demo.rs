use crate::infra::{catalog_service, load_catalog};
use chrono::{DateTime, Utc};
use clap::Args;
use forest_subsidy::batch::{BatchEntry, BatchEvaluation, ProjectImporter};
use forest_subsidy::catalog::SubsidyCatalog;
use forest_subsidy::eligibility::{EligibilityResult, Project};
use forest_subsidy::error::AppError;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Subsidy catalogue JSON file (defaults to the built-in programs)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Project description as a JSON file
    #[arg(long)]
    pub(crate) project: PathBuf,
    /// Identifier of the catalogue subsidy to check
    #[arg(long)]
    pub(crate) subsidy_id: String,
    /// Evaluation instant (RFC 3339 or YYYY-MM-DD, defaults to now)
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) at: Option<DateTime<Utc>>,
    /// Print the raw JSON result instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one project per row
    #[arg(long)]
    pub(crate) projects: PathBuf,
    /// Identifier of the catalogue subsidy to check
    #[arg(long)]
    pub(crate) subsidy_id: String,
    /// Evaluation instant (RFC 3339 or YYYY-MM-DD, defaults to now)
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) at: Option<DateTime<Utc>>,
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation instant (RFC 3339 or YYYY-MM-DD, defaults to now)
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) at: Option<DateTime<Utc>>,
    /// Print every condition, not only the failing ones
    #[arg(long)]
    pub(crate) verbose: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        project,
        subsidy_id,
        at,
        json,
        catalog,
    } = args;

    let project: Project = serde_json::from_reader(BufReader::new(File::open(project)?))?;
    let service = catalog_service(catalog.catalog.as_deref())?;
    let now = at.unwrap_or_else(Utc::now);
    let result = service.evaluate_at(&project, &subsidy_id, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Projet : {}", project.display_name());
        print!("{}", format_result(&result, true));
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        projects,
        subsidy_id,
        at,
        catalog,
    } = args;

    let projects = ProjectImporter::from_path(projects)?;
    let service = catalog_service(catalog.catalog.as_deref())?;
    let subsidy = service.subsidy(&subsidy_id)?;
    let now = at.unwrap_or_else(Utc::now);
    let batch = BatchEvaluation::run(service.engine(), &projects, &subsidy, now);

    println!(
        "Évaluation groupée pour {} ({}) au {}",
        subsidy.title,
        batch.subsidy_id,
        batch.evaluated_at.to_rfc3339()
    );
    for entry in &batch.entries {
        println!("{}", format_batch_entry(entry));
    }
    println!(
        "{} projet(s) éligible(s) sur {} | financement total {:.2} €",
        batch.eligible_count(),
        batch.entries.len(),
        batch.total_funding()
    );
    Ok(())
}

pub(crate) fn run_subsidies(args: CatalogArgs) -> Result<(), AppError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let subsidies = catalog.list()?;

    println!("Catalogue des aides ({} programmes)", subsidies.len());
    for subsidy in &subsidies {
        println!(
            "- {} [{}] {}",
            subsidy.id,
            subsidy.subsidy_type.as_deref().unwrap_or("base"),
            subsidy.title
        );
        if let Some(organization) = &subsidy.organization {
            println!("    organisme : {organization}");
        }
        if let Some(deadline) = &subsidy.deadline {
            println!("    date limite : {deadline}");
        }
        if let Some(amount) = subsidy.amount_per_ha {
            let rate = subsidy
                .funding_rate
                .map(|rate| format!(" à {rate} %"))
                .unwrap_or_default();
            println!("    {amount:.0} €/ha{rate}");
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { at, verbose } = args;
    let now = at.unwrap_or_else(Utc::now);
    let service = catalog_service(None)?;

    println!("Démonstration de l'éligibilité aux aides forestières");
    let scenarios = [
        ("Reboisement après incendie", reforestation_project()),
        ("Même parcelle, dossier complet", documented_project()),
    ];

    for (label, project) in scenarios {
        println!("\n{label} : {}", project.display_name());
        println!(
            "  {} ha de {} en {}",
            project.area_or_zero(),
            project.species().join(", "),
            project.region.as_deref().unwrap_or("région inconnue")
        );
        for result in service.matches_at(&project, now)? {
            print!("{}", format_result(&result, verbose));
        }
    }

    Ok(())
}

fn format_batch_entry(entry: &BatchEntry) -> String {
    let verdict = if entry.result.eligible {
        format!("éligible, {:.2} €", entry.result.total_funding())
    } else {
        let blocking: Vec<&str> = entry
            .result
            .blocking_conditions()
            .map(|condition| condition.condition.as_str())
            .collect();
        format!("non éligible ({})", blocking.join(", "))
    };
    format!("- {} : {}", entry.project_name, verdict)
}

fn format_result(result: &EligibilityResult, verbose: bool) -> String {
    let mut lines = vec![format!("- {}", result.summary())];

    for condition in result
        .conditions
        .iter()
        .filter(|condition| verbose || !condition.satisfied)
    {
        let mark = if condition.satisfied { "ok" } else { "KO" };
        lines.push(format!(
            "    [{mark}] {} : {}",
            condition.condition, condition.details
        ));
    }

    if let Some(funding) = &result.funding_details {
        lines.push(format!(
            "    base {:.2} € + bonus {:.2} € = {:.2} €",
            funding.base_amount, funding.bonus_amount, funding.total_amount
        ));
        for bonus in &funding.breakdown.bonuses {
            lines.push(format!(
                "      {} ({} %) : {:.2} €",
                bonus.bonus_type, bonus.rate, bonus.amount
            ));
        }
    }

    if verbose && !result.next_steps.is_empty() {
        lines.push("    prochaines étapes :".to_string());
        for step in &result.next_steps {
            lines.push(format!("      * {step}"));
        }
    }

    lines.iter().map(|line| format!("{line}\n")).collect()
}

fn reforestation_project() -> Project {
    Project {
        name: Some("Parcelle des Maures".to_string()),
        project_type: Some("reforestation".to_string()),
        area_ha: Some(5.2),
        region: Some("Provence-Alpes-Côte d'Azur".to_string()),
        owner_type: Some("private".to_string()),
        species: Some(vec!["pinus_pinea".to_string()]),
        planting_density: Some(1200.0),
        ..Project::default()
    }
}

fn documented_project() -> Project {
    Project {
        priority_zones: Some(vec!["france_relance".to_string()]),
        has_management_document: Some(true),
        maintenance_commitment_years: Some(10),
        certifications: Some(vec!["PEFC".to_string()]),
        ..reforestation_project()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_parcel_qualifies_for_every_built_in_program() {
        let service = catalog_service(None).expect("built-in catalogue");

        let results = service
            .matches_at(&documented_project(), Utc::now())
            .expect("catalogue available");

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|result| result.eligible));
        assert_eq!(results[0].subsidy_id, "france-relance-renouvellement");
    }

    #[test]
    fn terminal_output_stays_in_french() {
        let service = catalog_service(None).expect("built-in catalogue");
        let project = reforestation_project();

        let eligible = service
            .evaluate_at(&project, "paca-reboisement", Utc::now())
            .expect("known subsidy");
        let rendered = format_result(&eligible, true);
        assert!(rendered.starts_with("- éligible à « "));
        assert!(rendered.contains("base 4160.00 € + bonus 0.00 € = 4160.00 €"));
        assert!(rendered.contains("prochaines étapes :"));

        let feader = service
            .evaluate_at(&project, "feader-boisement", Utc::now())
            .expect("known subsidy");
        let line = format_batch_entry(&BatchEntry {
            project_name: project.display_name().to_string(),
            result: feader,
        });
        assert!(line.starts_with("- Parcelle des Maures : non éligible ("));
        assert!(line.contains("Document de gestion durable"));
        for english in ["eligible,", "not eligible", "EUR", "next steps"] {
            assert!(!rendered.contains(english) && !line.contains(english), "{english}");
        }
    }

    #[test]
    fn undocumented_parcel_misses_only_feader() {
        let service = catalog_service(None).expect("built-in catalogue");

        let results = service
            .matches_at(&reforestation_project(), Utc::now())
            .expect("catalogue available");

        let ineligible: Vec<_> = results
            .iter()
            .filter(|result| !result.eligible)
            .map(|result| result.subsidy_id.as_str())
            .collect();
        assert_eq!(ineligible, ["feader-boisement"]);
    }
}
