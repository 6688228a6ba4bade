mod catalog;
mod cli;
mod config;
mod estimator;
mod handler;
mod output;
mod recommend;
mod types;

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command, OutputFormat};
use estimator::{Architecture, CostEstimator};
use recommend::{Component, ServiceRecommender};
use types::{Configuration, OpError, ServiceCost};

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut data = String::new();
        std::io::stdin()
            .read_to_string(&mut data)
            .context("Failed to read stdin")?;
        Ok(data)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

/// Print an operation result in the chosen format. Structured errors go to
/// stdout as JSON in both formats (they are results, not failures of the
/// tool itself) with a non-zero exit code.
fn render<T: serde::Serialize>(
    result: std::result::Result<T, OpError>,
    format: &OutputFormat,
    print_table: impl FnOnce(&T),
) {
    match result {
        Ok(value) => match format {
            OutputFormat::Json => output::print_json(&value),
            OutputFormat::Table => print_table(&value),
        },
        Err(e) => {
            output::print_json(&e);
            std::process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config();

    let region = cli.region.as_deref().or(config.region.as_deref());
    let discount_rate = cli.discount_rate.or(config.discount_rate);

    let catalog = catalog::load(&config, cli.offline);
    let estimator = CostEstimator::new(&catalog, region, discount_rate);
    let recommender = ServiceRecommender::new(&catalog);

    match cli.command {
        Command::Estimate {
            ref service,
            ref configuration,
        } => {
            let configuration: Configuration = serde_json::from_str(configuration)
                .context("Invalid configuration JSON")?;
            render(
                estimator.estimate_service_cost(service, &configuration),
                &cli.format,
                output::print_service_cost,
            );
        }
        Command::Total { ref input, onprem } => {
            let architecture: Architecture = serde_json::from_str(&read_input(input)?)
                .context("Invalid architecture JSON")?;
            let result = estimator.calculate_total_cost(&architecture).and_then(|mut e| {
                if let Some(onprem) = onprem {
                    e.comparison_with_onprem =
                        Some(estimator.compare_costs(onprem, e.total_monthly_cost)?);
                }
                Ok(e)
            });
            render(result, &cli.format, output::print_estimate);
        }
        Command::Discount { base_cost } => {
            render(
                estimator.apply_discount(base_cost),
                &cli.format,
                output::print_discount,
            );
        }
        Command::Optimize { ref input } => {
            let breakdown: Vec<ServiceCost> = serde_json::from_str(&read_input(input)?)
                .context("Invalid breakdown JSON")?;
            let optimizations = estimator.identify_optimizations(&breakdown);
            render(Ok(optimizations), &cli.format, |opts: &Vec<_>| {
                output::print_optimizations(opts)
            });
        }
        Command::CompareCosts {
            onprem_cost,
            aws_cost,
        } => {
            render(
                estimator.compare_costs(onprem_cost, aws_cost),
                &cli.format,
                output::print_comparison,
            );
        }
        Command::Recommend { ref input } => {
            let component: Component = serde_json::from_str(&read_input(input)?)
                .context("Invalid component JSON")?;
            let recommendations = recommender.recommend(&component);
            render(Ok(recommendations), &cli.format, |opts: &Vec<_>| {
                output::print_options(opts)
            });
        }
        Command::Details { ref service_name } => {
            render(
                recommender.get_details(service_name),
                &cli.format,
                output::print_details,
            );
        }
        Command::Compare { ref services } => {
            render(
                recommender.compare(services),
                &cli.format,
                output::print_service_comparison,
            );
        }
        Command::Docs { ref query } => {
            render(
                Ok(recommender.query_docs(query)),
                &cli.format,
                output::print_docs,
            );
        }
        Command::Invoke { ref input } => {
            let request: handler::InvokeRequest = serde_json::from_str(&read_input(input)?)
                .context("Invalid request JSON")?;
            let envelope = handler::handle(&request, &catalog, region, discount_rate);
            output::print_json(&envelope);
        }
    }

    Ok(())
}
