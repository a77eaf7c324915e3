use crate::prelude::{eprintln, println, *};
use calculator_core::history::{format_timestamp, DEFAULT_HISTORY_LIMIT, RETENTION_DAYS};
use calculator_core::HistoryRecord;
use colored::Colorize;

use crate::service::CalculationService;

#[derive(Debug, clap::Args, Clone)]
pub struct HistoryOptions {
    /// Maximum number of calculations to show
    #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(
    options: HistoryOptions,
    service: &CalculationService,
    global: &crate::Global,
) -> Result<()> {
    if global.verbose {
        eprintln!(
            "Reading up to {} calculations from {}",
            options.limit, global.database
        );
    }

    // A zero limit falls back to the default, like the HTTP endpoint.
    let limit = if options.limit == 0 {
        DEFAULT_HISTORY_LIMIT
    } else {
        options.limit
    };

    let records = service.get_calculation_history(limit).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!(
            "{}",
            f!("No calculations in the last {RETENTION_DAYS} days.").yellow()
        );
        return Ok(());
    }

    println!("Found {} calculation(s):\n", records.len());
    history_table(&records).printstd();

    Ok(())
}

pub async fn run_cleanup(service: &CalculationService, global: &crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Removing calculations older than {RETENTION_DAYS} days");
    }

    let deleted = service.cleanup_history().await?;
    println!(
        "{} {} old calculation(s)",
        "Deleted".green(),
        deleted.to_string().bright_white().bold()
    );

    Ok(())
}

fn history_table(records: &[HistoryRecord]) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(prettytable::row!["ID", "Expression", "Result", "Mode", "Created"]);

    for record in records {
        table.add_row(prettytable::row![
            record.id,
            &record.expression,
            &record.result,
            record.mode,
            format_timestamp(record.created_at)
        ]);
    }

    table
}
