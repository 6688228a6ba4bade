use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::recommend::DocsResult;
use crate::types::{
    round2, CostComparison, CostEstimate, CostOptimization, DiscountSummary, ServiceComparison,
    ServiceCost, ServiceDetails, ServiceOption,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_cost(cost: f64) -> String {
    format!("${:.2}", round2(cost))
}

fn format_config(configuration: &crate::types::Configuration) -> String {
    configuration
        .iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_service_cost(cost: &ServiceCost) {
    let mut table = new_table();
    table.set_header(["Service", "Configuration", "Units", "Pricing", "Region", "Monthly"]);
    table.add_row([
        Cell::new(&cost.service_name),
        Cell::new(format_config(&cost.configuration)),
        Cell::new(cost.units),
        Cell::new(&cost.pricing_model),
        Cell::new(&cost.region),
        Cell::new(format_cost(cost.monthly_cost)),
    ]);
    println!("{table}");
}

pub fn print_estimate(estimate: &CostEstimate) {
    let mut table = new_table();
    table.set_header(["Service", "Configuration", "Units", "Monthly"]);
    for cost in &estimate.breakdown {
        table.add_row([
            Cell::new(&cost.service_name),
            Cell::new(format_config(&cost.configuration)),
            Cell::new(cost.units),
            Cell::new(format_cost(cost.monthly_cost)),
        ]);
    }
    table.add_row([
        Cell::new("TOTAL"),
        Cell::new(format!(
            "after {} discount",
            format_cost(estimate.discount_applied)
        )),
        Cell::new(""),
        Cell::new(format_cost(estimate.total_monthly_cost)),
    ]);
    println!("{table}");

    if !estimate.optimizations.is_empty() {
        println!();
        print_optimizations(&estimate.optimizations);
    }

    if let Some(ref comparison) = estimate.comparison_with_onprem {
        println!();
        print_comparison(comparison);
    }
}

pub fn print_optimizations(optimizations: &[CostOptimization]) {
    let mut table = new_table();
    table.set_header(["Recommendation", "Current", "Optimized", "Savings", "Effort", "Priority"]);
    let mut total = 0.0;
    for opt in optimizations {
        table.add_row([
            Cell::new(&opt.recommendation),
            Cell::new(format_cost(opt.current_cost)),
            Cell::new(format_cost(opt.optimized_cost)),
            Cell::new(format_cost(opt.potential_savings)),
            Cell::new(format!("{:?}", opt.effort).to_uppercase()),
            Cell::new(format!("{:?}", opt.priority).to_uppercase()),
        ]);
        total += opt.potential_savings;
    }
    table.add_row([
        Cell::new("TOTAL"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format_cost(total)),
        Cell::new(""),
        Cell::new(""),
    ]);
    println!("{table}");
}

pub fn print_discount(summary: &DiscountSummary) {
    let mut table = new_table();
    table.set_header(["Base", "Discount", "Amount", "Final", "Type"]);
    table.add_row([
        Cell::new(format_cost(summary.base_cost)),
        Cell::new(format!("{}%", summary.savings_percentage)),
        Cell::new(format_cost(summary.discount_amount)),
        Cell::new(format_cost(summary.final_cost)),
        Cell::new(&summary.discount_type),
    ]);
    println!("{table}");
}

pub fn print_comparison(comparison: &CostComparison) {
    let mut table = new_table();
    table.set_header(["On-Prem Monthly", "AWS Monthly", "Difference", "Change", "Breakeven"]);
    table.add_row([
        Cell::new(format_cost(comparison.onprem_monthly_cost)),
        Cell::new(format_cost(comparison.aws_monthly_cost)),
        Cell::new(format_cost(comparison.difference)),
        Cell::new(format!("{:.2}%", comparison.percentage_change)),
        Cell::new(match comparison.breakeven_months {
            Some(months) => format!("{months} months"),
            None => "-".to_string(),
        }),
    ]);
    println!("{table}");
}

pub fn print_options(options: &[ServiceOption]) {
    let mut table = new_table();
    table.set_header(["Rank", "Service", "Approved", "Est. Monthly", "Pros", "Cons"]);
    for option in options {
        table.add_row([
            Cell::new(option.rank),
            Cell::new(&option.service_name),
            Cell::new(if option.approved { "yes" } else { "no" }),
            Cell::new(format_cost(option.estimated_monthly_cost)),
            Cell::new(option.pros.join("\n")),
            Cell::new(option.cons.join("\n")),
        ]);
    }
    println!("{table}");
}

pub fn print_service_comparison(comparison: &ServiceComparison) {
    let mut table = new_table();
    table.set_header(["Service", "Description", "Pricing", "Management", "Scalability", "Approved"]);
    for (name, entry) in &comparison.comparison_matrix {
        match entry {
            crate::types::ComparisonEntry::Known(details) => {
                table.add_row([
                    Cell::new(name),
                    Cell::new(&details.description),
                    Cell::new(&details.pricing_model),
                    Cell::new(&details.management_level),
                    Cell::new(&details.scalability),
                    Cell::new(if details.approved { "yes" } else { "no" }),
                ]);
            }
            crate::types::ComparisonEntry::Missing { error } => {
                table.add_row([
                    Cell::new(name),
                    Cell::new(error),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                ]);
            }
        }
    }
    println!("{table}");
    println!("Recommendation: {}", comparison.recommendation);
    println!("{}", comparison.reasoning);
}

pub fn print_details(details: &ServiceDetails) {
    let mut table = new_table();
    table.set_header([details.service_name.as_str(), ""]);
    table.add_row([Cell::new("Description"), Cell::new(&details.description)]);
    table.add_row([Cell::new("Pricing"), Cell::new(&details.pricing_model)]);
    table.add_row([Cell::new("Management"), Cell::new(&details.management_level)]);
    table.add_row([Cell::new("Scalability"), Cell::new(&details.scalability)]);
    table.add_row([Cell::new("Features"), Cell::new(details.features.join("\n"))]);
    table.add_row([Cell::new("Use cases"), Cell::new(details.use_cases.join("\n"))]);
    table.add_row([Cell::new("Pros"), Cell::new(details.pros.join("\n"))]);
    table.add_row([Cell::new("Cons"), Cell::new(details.cons.join("\n"))]);
    table.add_row([
        Cell::new("Approved"),
        Cell::new(if details.approved { "yes" } else { "no" }),
    ]);
    table.add_row([Cell::new("Docs"), Cell::new(&details.documentation_link)]);
    println!("{table}");
}

pub fn print_docs(result: &DocsResult) {
    match result {
        DocsResult::Matches {
            relevant_services, ..
        } => {
            let mut table = new_table();
            table.set_header(["Service", "Description", "Use cases", "Docs"]);
            for doc in relevant_services {
                table.add_row([
                    Cell::new(&doc.service),
                    Cell::new(&doc.description),
                    Cell::new(doc.use_cases.join("\n")),
                    Cell::new(&doc.documentation_link),
                ]);
            }
            println!("{table}");
        }
        DocsResult::NoMatch {
            response,
            suggestion,
        } => {
            println!("{response}");
            println!("{suggestion}");
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Warning: failed to serialize output: {e}"),
    }
}
