use clap::Parser;
use inverter_docs::{Priority, Registry, Status as TestStatus};
use tracing::instrument;

use super::{
    Sources,
    terminal::{Colorize, is_narrow, priority_badge},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show test counts by category, priority and status")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub(super) fn run(self, sources: &Sources) -> anyhow::Result<()> {
        let session = sources.session()?;
        let registry = session.matrix().registry();

        if registry.count_total() == 0 {
            println!("The catalog contains no test cases.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => Self::output_json(registry)?,
            OutputFormat::Table => {
                if self.quiet {
                    Self::output_quiet(registry);
                } else {
                    Self::output_table(registry);
                }
            }
        }

        Ok(())
    }

    fn output_json(registry: &Registry) -> anyhow::Result<()> {
        use serde_json::json;

        let categories: Vec<_> = registry
            .categories()
            .map(|(key, category)| {
                json!({
                    "key": key.as_str(),
                    "name": category.name(),
                    "count": category.len(),
                    "critical": category.count_by_priority(Priority::Critical),
                })
            })
            .collect();

        let priorities: serde_json::Map<_, _> = registry
            .priority_breakdown()
            .into_iter()
            .map(|(priority, count)| (priority.as_str().to_string(), json!(count)))
            .collect();

        let statuses: serde_json::Map<_, _> = registry
            .status_breakdown()
            .into_iter()
            .map(|(status, count)| (status.as_str().to_string(), json!(count)))
            .collect();

        let output = json!({
            "total": registry.count_total(),
            "categories": categories,
            "priorities": priorities,
            "statuses": statuses,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(registry: &Registry) {
        let statuses = registry.status_breakdown();
        println!(
            "total={} critical={} pass={} fail={} pending={}",
            registry.count_total(),
            registry.count_by_priority(Priority::Critical),
            statuses.get(&TestStatus::Pass).copied().unwrap_or_default(),
            statuses.get(&TestStatus::Fail).copied().unwrap_or_default(),
            statuses.get(&TestStatus::Pending).copied().unwrap_or_default(),
        );
    }

    fn output_table(registry: &Registry) {
        let narrow = is_narrow();

        println!("Test counts");
        println!("{}", "───────────".dim());

        if narrow {
            for (_, category) in registry.categories() {
                println!("{}: {}", category.name(), category.len());
            }
        } else {
            let width = registry
                .categories()
                .map(|(_, category)| category.name().len())
                .max()
                .unwrap_or(0)
                .max("Category".len());
            println!("{:<width$}  {:>5}  {:>8}", "Category", "Tests", "Critical");
            for (_, category) in registry.categories() {
                println!(
                    "{:<width$}  {:>5}  {:>8}",
                    category.name(),
                    category.len(),
                    category.count_by_priority(Priority::Critical)
                );
            }
        }
        println!("Total: {}", registry.count_total());

        println!();
        println!("By priority");
        println!("{}", "───────────".dim());
        for (priority, count) in registry.priority_breakdown() {
            println!("{} {count}", priority_badge(priority, 9));
        }

        println!();
        let statuses = registry.status_breakdown();
        let count = |status: TestStatus| statuses.get(&status).copied().unwrap_or_default();
        let failed = count(TestStatus::Fail);
        println!(
            "Results: {} passed, {} failed, {} pending",
            count(TestStatus::Pass).to_string().success(),
            if failed == 0 {
                failed.to_string()
            } else {
                failed.to_string().error()
            },
            count(TestStatus::Pending).to_string().dim(),
        );
    }
}
