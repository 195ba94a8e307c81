use clap::Parser;
use inverter_docs::{Config, DevicePosition, StateDefinition, StateTable};
use serde_json::json;
use tracing::instrument;

use super::{Sources, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Check the switching table, catalog and configuration")]
pub struct Validate {
    /// Types of checks to run (can be specified multiple times)
    #[arg(long, value_name = "TYPE")]
    check: Vec<CheckType>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
enum CheckType {
    /// Check every switching state against the topology rules
    States,
    /// Check the test catalog loads and has no empty categories
    Catalog,
    /// Check the configuration file and the categories it names
    Config,
    /// Run all checks
    All,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

#[derive(Debug, Default)]
struct ValidationResult {
    states: Option<usize>,
    tests: Option<usize>,
    state_issues: Vec<String>,
    catalog_issues: Vec<String>,
    config_issues: Vec<String>,
}

impl ValidationResult {
    fn count_issues(&self) -> usize {
        self.state_issues.len() + self.catalog_issues.len() + self.config_issues.len()
    }
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub(super) fn run(self, sources: &Sources) -> anyhow::Result<()> {
        let checks = if self.check.is_empty() || self.check.contains(&CheckType::All) {
            vec![CheckType::States, CheckType::Catalog, CheckType::Config]
        } else {
            self.check.clone()
        };

        let mut result = ValidationResult::default();

        for check in &checks {
            match check {
                CheckType::States => check_states(&mut result),
                CheckType::Catalog => check_catalog(sources, &mut result),
                CheckType::Config => check_config(sources, &mut result),
                CheckType::All => unreachable!("All should have been expanded"),
            }
        }

        match self.output {
            OutputFormat::Table => self.output_table(&result),
            OutputFormat::Json => output_json(&result)?,
            OutputFormat::Summary => println!("issues={}", result.count_issues()),
        }

        if result.count_issues() > 0 {
            std::process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, result: &ValidationResult) {
        if self.quiet {
            return;
        }

        println!("Validating documentation data...\n");

        if let Some(states) = result.states {
            report(
                "States: ",
                &format!("{states} levels, no shoot-through, clamp pair consistent"),
                &result.state_issues,
            );
        }
        if let Some(tests) = result.tests {
            report("Catalog:", &format!("{tests} tests loaded"), &result.catalog_issues);
        } else if !result.catalog_issues.is_empty() {
            report("Catalog:", "", &result.catalog_issues);
        }
        report("Config: ", "consistent with catalog", &result.config_issues);

        let total = result.count_issues();
        if total == 0 {
            println!("\n{}", "All checks passed (0 issues)".success());
        } else {
            println!("\n{}", format!("Summary: {total} issues found").warning());
        }
    }
}

fn report(label: &str, healthy: &str, issues: &[String]) {
    if issues.is_empty() {
        println!("✓ {label}  {healthy}");
    } else {
        println!(
            "{}",
            format!("✗ {label}  {} issues found", issues.len()).warning()
        );
        for issue in issues {
            println!("    • {issue}");
        }
    }
}

fn check_states(result: &mut ValidationResult) {
    let definitions = StateTable::builtin_definitions();
    result.states = Some(definitions.len());
    result.state_issues.extend(state_issues(&definitions));
}

/// Checks each definition on its own, then the table as a whole.
fn state_issues(definitions: &[StateDefinition]) -> Vec<String> {
    let issues: Vec<_> = definitions
        .iter()
        .filter_map(|definition| {
            let violation = definition.check().err()?;
            let conducting = definition
                .conduction()
                .conducting()
                .map(DevicePosition::designator)
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!(
                "{} [{conducting}]: {violation}",
                definition.level().symbol()
            ))
        })
        .collect();

    if !issues.is_empty() {
        return issues;
    }

    match StateTable::new(definitions.iter().copied()) {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    }
}

fn check_catalog(sources: &Sources, result: &mut ValidationResult) {
    // a broken config file is reported by the config check
    let config = sources.config().unwrap_or_default();
    let registry = match sources.registry(&config) {
        Ok(registry) => registry,
        Err(e) => {
            result.catalog_issues.push(format!("{e:#}"));
            return;
        }
    };

    result.tests = Some(registry.count_total());
    for (key, category) in registry.categories() {
        if category.is_empty() {
            result
                .catalog_issues
                .push(format!("category '{key}' has no test cases"));
        }
    }
}

fn check_config(sources: &Sources, result: &mut ValidationResult) {
    let config: Config = match sources.config() {
        Ok(config) => config,
        Err(e) => {
            result.config_issues.push(format!("{e:#}"));
            return;
        }
    };

    let Ok(registry) = sources.registry(&config) else {
        // reported by the catalog check
        return;
    };

    for key in &config.collapsed {
        if registry.category(key).is_none() {
            result
                .config_issues
                .push(format!("collapsed category '{key}' is not in the catalog"));
        }
    }
}

fn output_json(result: &ValidationResult) -> anyhow::Result<()> {
    let total = result.count_issues();
    let output = json!({
        "status": if total == 0 { "healthy" } else { "issues_found" },
        "counts": {
            "states": result.states,
            "tests": result.tests,
        },
        "issues": {
            "states": result.state_issues,
            "catalog": result.catalog_issues,
            "config": result.config_issues,
        },
        "summary": {
            "total_issues": total,
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
