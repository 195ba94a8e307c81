use clap::Parser;
use inverter_docs::{
    DevicePosition, OutputLevel, Request, StateDefinition, domain::DEVICES_PER_PHASE,
};
use serde_json::json;
use tracing::instrument;

use super::{
    Sources,
    terminal::{Colorize, conduction_marker},
};

#[derive(Debug, Parser)]
#[command(about = "Show the switching states of the T-type phase leg")]
pub struct Switch {
    /// Output level to show (P, O, N; or positive, zero, negative).
    ///
    /// Defaults to the configured initial level.
    #[arg(long, short, value_name = "LEVEL")]
    level: Option<String>,

    /// Show the full switching table instead of a single level.
    #[arg(long, conflicts_with = "level")]
    all: bool,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Switch {
    #[instrument(level = "debug", skip(self))]
    pub(super) fn run(self, sources: &Sources) -> anyhow::Result<()> {
        let mut session = sources.session()?;

        if let Some(level) = self.level {
            session.apply(Request::SelectLevel(level))?;
        }

        let definitions: Vec<&StateDefinition> = if self.all {
            session.switch().table().definitions().collect()
        } else {
            vec![session.current_state()]
        };

        match self.output {
            OutputFormat::Table => {
                for (index, definition) in definitions.iter().enumerate() {
                    if index > 0 {
                        println!();
                    }
                    output_table(definition);
                }
            }
            OutputFormat::Json => output_json(&definitions)?,
        }

        if self.all && matches!(self.output, OutputFormat::Table) {
            println!();
            println!(
                "{}",
                format!(
                    "{DEVICES_PER_PHASE} devices per phase, {} per three-phase stage",
                    DEVICES_PER_PHASE * 3
                )
                .dim()
            );
        }

        Ok(())
    }
}

fn output_table(definition: &StateDefinition) {
    let level = definition.level();
    let heading = format!(
        "State {} ({}): output {} = {}",
        level.symbol(),
        level.short_label(),
        definition.voltage(),
        definition.reference()
    );
    let heading = match level {
        OutputLevel::Positive => heading.success(),
        OutputLevel::Zero => heading.info(),
        OutputLevel::Negative => heading.error(),
    };
    println!("{heading}");

    for position in DevicePosition::ALL {
        println!(
            "  {:<3} {:<25} {}  {}",
            position.designator(),
            position.role(),
            conduction_marker(definition.is_on(position)),
            format!(
                "{}, blocks {}",
                position.device_arrangement(),
                position.blocking_voltage()
            )
            .dim()
        );
    }

    let path = definition
        .conduction()
        .conducting()
        .map(DevicePosition::designator)
        .collect::<Vec<_>>()
        .join(" + ");
    println!(
        "  {}",
        format!("output connected to {} via {path}", level.bus_node()).dim()
    );
}

fn output_json(definitions: &[&StateDefinition]) -> anyhow::Result<()> {
    let states: Vec<_> = definitions
        .iter()
        .map(|definition| {
            let devices: serde_json::Map<_, _> = DevicePosition::ALL
                .into_iter()
                .map(|position| {
                    (
                        position.designator().to_string(),
                        json!({
                            "on": definition.is_on(position),
                            "role": position.role(),
                            "arrangement": position.device_arrangement(),
                            "blocks": position.blocking_voltage(),
                        }),
                    )
                })
                .collect();

            json!({
                "level": definition.level().symbol().to_string(),
                "name": definition.level().to_string(),
                "voltage": definition.voltage(),
                "reference": definition.reference(),
                "bus_node": definition.level().bus_node().to_string(),
                "devices": devices,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&states)?);
    Ok(())
}
