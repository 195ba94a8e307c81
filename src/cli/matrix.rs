use anyhow::Context;
use clap::{Parser, ValueEnum};
use inverter_docs::{
    Request, TestCase,
    domain::{MatrixView, Outcome, Requirement},
};
use serde::Serialize;
use tracing::instrument;

use super::{
    Sources,
    terminal::{Colorize, priority_badge, status_icon},
};

/// Command arguments for `invdoc matrix`.
#[derive(Debug, Parser)]
#[command(about = "Show the test specification matrix")]
pub struct Matrix {
    /// Only show tests of this priority (all, critical, high, medium, low).
    #[arg(long, short, value_name = "PRIORITY")]
    priority: Option<String>,

    /// Case-insensitive substring match against test name, id and
    /// requirements.
    #[arg(long, short, default_value = "")]
    search: String,

    /// Expand or collapse a category (repeatable).
    #[arg(long, value_name = "KEY")]
    toggle: Vec<String>,

    /// Record a test result before rendering, as ID=STATUS (repeatable).
    #[arg(long, value_name = "ID=STATUS", value_parser = parse_result)]
    result: Vec<(String, String)>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct SerializableCategory<'a> {
    key: &'a str,
    name: &'a str,
    expanded: bool,
    tests: Vec<SerializableTest<'a>>,
}

#[derive(Debug, Serialize)]
struct SerializableTest<'a> {
    id: &'a str,
    name: &'a str,
    requirements: Vec<&'a str>,
    priority: &'a str,
    duration: &'a str,
    status: &'a str,
    criteria: &'a str,
}

impl<'a> From<&'a TestCase> for SerializableTest<'a> {
    fn from(test: &'a TestCase) -> Self {
        Self {
            id: test.id().as_str(),
            name: test.name(),
            requirements: test.requirements().iter().map(Requirement::as_str).collect(),
            priority: test.priority().as_str(),
            duration: test.duration(),
            status: test.status().as_str(),
            criteria: test.criteria(),
        }
    }
}

impl Matrix {
    #[instrument(level = "debug", skip_all)]
    pub(super) fn run(self, sources: &Sources) -> anyhow::Result<()> {
        let mut session = sources.session()?;

        for (test_id, status) in self.result {
            let outcome = session
                .apply(Request::UpdateStatus {
                    test_id: test_id.clone(),
                    status,
                })
                .with_context(|| format!("cannot record result for {test_id}"))?;
            if let Outcome::StatusUpdated { previous, current } = outcome {
                tracing::info!(%test_id, %previous, %current, "recorded result");
            }
        }

        let priority = self
            .priority
            .unwrap_or_else(|| session.matrix().filter().priority().to_string());
        session.apply(Request::ChangeFilter {
            priority,
            search: self.search,
        })?;

        for key in self.toggle {
            session.apply(Request::ToggleCategory(key))?;
        }

        let filter = session.matrix().filter();
        if !filter.is_unrestricted() && !self.quiet {
            eprintln!(
                "{}",
                format!("filter: priority={} search='{}'", filter.priority(), filter.search())
                    .dim()
            );
        }

        let view = session.matrix_view();
        match self.output {
            OutputFormat::Table => render_table(&view, self.quiet),
            OutputFormat::Json => render_json(&view)?,
            OutputFormat::Csv => render_csv(&view, self.quiet),
        }

        Ok(())
    }
}

fn parse_result(value: &str) -> Result<(String, String), String> {
    let (id, status) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=STATUS, got '{value}'"))?;
    Ok((id.trim().to_string(), status.trim().to_string()))
}

fn render_table(view: &MatrixView, quiet: bool) {
    if quiet {
        for test in view.visible.tests() {
            println!(
                "{}\t{}\t{}\t{}",
                test.id(),
                test.priority(),
                test.status(),
                test.requirements_label()
            );
        }
        return;
    }

    println!(
        "Total: {}   Critical: {}   Shown: {}",
        view.total.to_string().info(),
        view.critical.to_string().error(),
        view.visible.count_total()
    );
    println!();

    if view.visible.is_empty() {
        println!("{}", "No tests match the current filter.".dim());
        return;
    }

    for (key, category, expanded) in view.rows() {
        let marker = if expanded { "▾" } else { "▸" };
        println!(
            "{marker} {} {}",
            category.name(),
            format!("({} tests) [{key}]", category.len()).dim()
        );

        if !expanded {
            continue;
        }

        let id_width = column_width(category.tests().iter().map(|t| t.id().as_str()), "ID");
        let name_width = column_width(category.tests().iter().map(TestCase::name), "Test Name");
        let req_width = column_width(
            category
                .tests()
                .iter()
                .flat_map(|t| t.requirements().iter().map(Requirement::as_str)),
            "Requirement",
        );

        println!(
            "    {:<id_width$}  {:<name_width$}  {:<req_width$}  {:<8}  {:<5}  Status",
            "ID", "Test Name", "Requirement", "Priority", "Time"
        );
        for test in category.tests() {
            let mut requirements = test.requirements().iter();
            let first = requirements.next().map_or("", Requirement::as_str);
            println!(
                "    {}  {:<name_width$}  {}  {}  {:<5}  {}",
                format!("{:<id_width$}", test.id().as_str()).info(),
                test.name(),
                format!("{first:<req_width$}").success(),
                priority_badge(test.priority(), 8),
                test.duration(),
                status_icon(test.status()),
            );
            for requirement in requirements {
                println!(
                    "    {:<id_width$}  {:<name_width$}  {}",
                    "",
                    "",
                    requirement.as_str().success()
                );
            }
            if !test.criteria().is_empty() {
                println!(
                    "    {:<id_width$}  {}",
                    "",
                    test.criteria().dim()
                );
            }
        }
        println!();
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|value| value.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}

fn render_json(view: &MatrixView) -> anyhow::Result<()> {
    let categories: Vec<_> = view
        .rows()
        .map(|(key, category, expanded)| SerializableCategory {
            key: key.as_str(),
            name: category.name(),
            expanded,
            tests: category.tests().iter().map(SerializableTest::from).collect(),
        })
        .collect();

    serde_json::to_writer_pretty(std::io::stdout(), &categories)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

fn render_csv(view: &MatrixView, quiet: bool) {
    if !quiet {
        println!("category,id,name,requirements,priority,duration,status,criteria");
    }

    for (key, category, _) in view.rows() {
        for test in category.tests() {
            let requirements = test
                .requirements()
                .iter()
                .map(Requirement::as_str)
                .collect::<Vec<_>>()
                .join(";");
            let values = [
                key.as_str(),
                test.id().as_str(),
                test.name(),
                &requirements,
                test.priority().as_str(),
                test.duration(),
                test.status().as_str(),
                test.criteria(),
            ];
            println!(
                "{}",
                values
                    .iter()
                    .map(|value| csv_escape(value))
                    .collect::<Vec<_>>()
                    .join(",")
            );
        }
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}
