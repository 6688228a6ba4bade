use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "cloudcost",
    about = "AWS cost estimation and service recommendation for migration planning"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format: table (default), json
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Use cached catalog only, don't fetch
    #[arg(long, global = true)]
    pub offline: bool,

    /// AWS region for pricing (default: us-east-1)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Discount rate as a fraction, e.g. 0.10 for 10%
    #[arg(long, global = true)]
    pub discount_rate: Option<f64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Estimate the monthly cost of one service
    Estimate {
        /// Service name, e.g. "Amazon EC2"
        service: String,
        /// Configuration as inline JSON, e.g. '{"instance_type":"t3.medium"}'
        #[arg(default_value = "{}")]
        configuration: String,
    },
    /// Estimate a whole architecture from a JSON file (or stdin with "-")
    Total {
        /// Path to an architecture JSON file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
        /// On-premises monthly cost to compare against
        #[arg(long)]
        onprem: Option<f64>,
    },
    /// Apply the enterprise discount to a base monthly cost
    Discount {
        base_cost: f64,
    },
    /// Identify optimization opportunities in a cost breakdown
    Optimize {
        /// Path to a breakdown JSON file (array of service costs), or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Compare on-premises vs AWS monthly costs
    CompareCosts {
        onprem_cost: f64,
        aws_cost: f64,
    },
    /// Recommend AWS services for a component
    Recommend {
        /// Path to a component JSON file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Show catalog details for one service
    Details {
        service_name: String,
    },
    /// Compare two or more services side by side
    Compare {
        #[arg(num_args = 2..)]
        services: Vec<String>,
    },
    /// Search the service knowledge catalog
    Docs {
        query: String,
    },
    /// Process a function-call request from a JSON file (or stdin with "-")
    Invoke {
        #[arg(default_value = "-")]
        input: String,
    },
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}
