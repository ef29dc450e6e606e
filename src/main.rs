mod cli;
mod emit;
mod error;
mod extractor;
mod fmt;
mod mapper;
mod models;
mod settings;
mod variance;
mod verify;
mod workbook;

use clap::Parser;

use cli::{Cli, Commands, ReportCommands, RulesCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { workbook, rules } => cli::init::run(workbook, rules),
        Commands::Extract {
            workbook,
            period,
            from_date,
            to_date,
            json,
            ts,
            rules,
        } => cli::extract::run(workbook, period, from_date, to_date, json, ts, rules),
        Commands::Report { command } => match command {
            ReportCommands::Summary {
                workbook,
                period,
                from_date,
                to_date,
                rules,
            } => cli::report::summary(workbook, period, from_date, to_date, rules),
            ReportCommands::Variance {
                workbook,
                period,
                from_date,
                to_date,
                rules,
            } => cli::report::variance(workbook, period, from_date, to_date, rules),
            ReportCommands::Budget { workbook, rules } => cli::report::budget(workbook, rules),
            ReportCommands::Unmapped {
                workbook,
                period,
                from_date,
                to_date,
                rules,
            } => cli::report::unmapped(workbook, period, from_date, to_date, rules),
        },
        Commands::Rules { command } => match command {
            RulesCommands::List { workbook, rules } => cli::rules::list(workbook, rules),
            RulesCommands::Check {
                label,
                workbook,
                rules,
            } => cli::rules::check(&label, workbook, rules),
        },
        Commands::Verify { file } => cli::verify::run(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
