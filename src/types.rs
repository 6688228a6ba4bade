use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Average hours in a month, used by every hourly billing model.
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Round to 2 decimal places (cents).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Serialize a monetary amount rounded to cents. Internal math keeps full
/// precision; only the wire representation is rounded.
pub(crate) fn ser_money<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round2(*v))
}

pub(crate) fn ser_money_opt<S: Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(c) => s.serialize_f64(round2(*c)),
        None => s.serialize_none(),
    }
}

/// Free-form service configuration as passed by the caller. Recognized keys
/// are service-specific; unrecognized keys are carried through untouched.
pub type Configuration = serde_json::Map<String, Value>;

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn one() -> u64 {
    1
}

/// Monthly cost for a single service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCost {
    pub service_name: String,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(serialize_with = "ser_money")]
    pub monthly_cost: f64,
    #[serde(default, serialize_with = "ser_money")]
    pub unit_cost: f64,
    #[serde(default = "one")]
    pub units: u64,
    #[serde(default)]
    pub pricing_model: String,
    #[serde(default = "default_region")]
    pub region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Effort {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A cost optimization opportunity derived from a service's configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostOptimization {
    pub recommendation: String,
    #[serde(serialize_with = "ser_money")]
    pub current_cost: f64,
    #[serde(serialize_with = "ser_money")]
    pub optimized_cost: f64,
    #[serde(serialize_with = "ser_money")]
    pub potential_savings: f64,
    pub effort: Effort,
    pub priority: Priority,
}

impl CostOptimization {
    /// Build an optimization that saves a fixed fraction of the current cost.
    /// Keeps `optimized_cost == current_cost - potential_savings` by
    /// construction.
    pub fn saving(
        recommendation: impl Into<String>,
        current_cost: f64,
        fraction: f64,
        effort: Effort,
        priority: Priority,
    ) -> Self {
        let savings = current_cost * fraction;
        Self {
            recommendation: recommendation.into(),
            current_cost,
            optimized_cost: current_cost - savings,
            potential_savings: savings,
            effort,
            priority,
        }
    }
}

/// On-premises vs cloud monthly cost comparison.
#[derive(Debug, Clone, Serialize)]
pub struct CostComparison {
    #[serde(serialize_with = "ser_money")]
    pub onprem_monthly_cost: f64,
    #[serde(serialize_with = "ser_money")]
    pub aws_monthly_cost: f64,
    #[serde(serialize_with = "ser_money")]
    pub difference: f64,
    #[serde(serialize_with = "ser_money")]
    pub percentage_change: f64,
    /// Months until the cloud premium pays back the assumed on-prem upfront
    /// capital. Present only when the cloud side is more expensive.
    pub breakeven_months: Option<u64>,
}

/// Aggregate estimate for a whole architecture.
#[derive(Debug, Clone, Serialize)]
pub struct CostEstimate {
    #[serde(serialize_with = "ser_money")]
    pub total_monthly_cost: f64,
    pub breakdown: Vec<ServiceCost>,
    pub optimizations: Vec<CostOptimization>,
    #[serde(serialize_with = "ser_money")]
    pub discount_applied: f64,
    pub comparison_with_onprem: Option<CostComparison>,
}

/// Result of applying the flat enterprise discount to a base cost.
#[derive(Debug, Clone, Serialize)]
pub struct DiscountSummary {
    #[serde(serialize_with = "ser_money")]
    pub base_cost: f64,
    pub discount_rate: f64,
    #[serde(serialize_with = "ser_money")]
    pub discount_amount: f64,
    #[serde(serialize_with = "ser_money")]
    pub final_cost: f64,
    pub discount_type: String,
    pub savings_percentage: f64,
}

/// One candidate service for a component, with rationale and a rough cost.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceOption {
    pub service_name: String,
    pub configuration: Configuration,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    #[serde(serialize_with = "ser_money")]
    pub estimated_monthly_cost: f64,
    /// 1 = best. Ties keep insertion order (stable sort contract).
    pub rank: u32,
    pub approved: bool,
    pub documentation_links: Vec<String>,
    pub use_cases: Vec<String>,
}

/// Attribute row for one service inside a comparison matrix. Unknown
/// services get an error entry instead of failing the whole comparison.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ComparisonEntry {
    Missing { error: String },
    Known(ComparisonDetails),
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonDetails {
    pub description: String,
    pub pricing_model: String,
    pub management_level: String,
    pub scalability: String,
    pub use_cases: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceComparison {
    pub services: Vec<String>,
    pub comparison_matrix: BTreeMap<String, ComparisonEntry>,
    pub recommendation: String,
    pub reasoning: String,
}

/// Full knowledge-catalog record for a single service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDetails {
    pub service_name: String,
    pub description: String,
    pub features: Vec<String>,
    pub use_cases: Vec<String>,
    pub pricing_model: String,
    pub management_level: String,
    pub scalability: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub documentation_link: String,
    pub approved: bool,
}

/// Structured error result. Expected "not found"/"invalid input" conditions
/// are returned as values with an `error` field — callers branch on the
/// field rather than catching anything. Optional context fields appear per
/// operation (an unknown service carries a zero cost estimate, a bad lookup
/// carries the list of known services).
#[derive(Debug, Clone, Serialize)]
pub struct OpError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_money_opt"
    )]
    pub estimated_monthly_cost: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_money_opt"
    )]
    pub total_monthly_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_services: Option<Vec<String>>,
}

impl OpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            service: None,
            estimated_monthly_cost: None,
            total_monthly_cost: None,
            available_services: None,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_estimated_cost(mut self, cost: f64) -> Self {
        self.estimated_monthly_cost = Some(cost);
        self
    }

    pub fn with_total_cost(mut self, cost: f64) -> Self {
        self.total_monthly_cost = Some(cost);
        self
    }

    pub fn with_available_services(mut self, services: Vec<String>) -> Self {
        self.available_services = Some(services);
        self
    }
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

impl std::error::Error for OpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_cents() {
        assert_eq!(round2(2.0736), 2.07);
        assert_eq!(round2(60.736), 60.74);
        assert_eq!(round2(0.004999), 0.0);
        assert_eq!(round2(-1.005), -1.0);
    }

    #[test]
    fn saving_preserves_invariant() {
        let opt = CostOptimization::saving("test", 100.0, 0.4, Effort::Low, Priority::High);
        assert_eq!(opt.potential_savings, 40.0);
        assert_eq!(opt.optimized_cost, opt.current_cost - opt.potential_savings);
    }

    #[test]
    fn money_fields_round_on_the_wire() {
        let cost = ServiceCost {
            service_name: "Amazon EC2".to_string(),
            configuration: Configuration::new(),
            monthly_cost: 60.736,
            unit_cost: 0.0,
            units: 1,
            pricing_model: "Per hour".to_string(),
            region: DEFAULT_REGION.to_string(),
        };
        let v = serde_json::to_value(&cost).unwrap();
        assert_eq!(v["monthly_cost"], serde_json::json!(60.74));
    }

    #[test]
    fn op_error_skips_absent_context() {
        let err = OpError::new("nope");
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v.as_object().unwrap().len(), 1);
        assert_eq!(v["error"], "nope");

        let err = OpError::new("nope").with_service("X").with_estimated_cost(0.0);
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["service"], "X");
        assert_eq!(v["estimated_monthly_cost"], serde_json::json!(0.0));
    }

    #[test]
    fn levels_serialize_uppercase() {
        assert_eq!(serde_json::to_value(Effort::Low).unwrap(), "LOW");
        assert_eq!(serde_json::to_value(Priority::High).unwrap(), "HIGH");
    }
}
