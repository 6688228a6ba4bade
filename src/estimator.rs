use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{BillingModel, Catalog, ServicePricing};
use crate::types::{
    Configuration, CostComparison, CostEstimate, CostOptimization, DiscountSummary, Effort,
    OpError, Priority, ServiceCost, DEFAULT_REGION, HOURS_PER_MONTH,
};

/// Flat enterprise agreement discount applied to architecture subtotals.
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;

/// Share of the annual on-prem cost assumed to be upfront capital, used for
/// the breakeven estimate when the cloud side is more expensive.
const ONPREM_UPFRONT_RATIO: f64 = 0.20;

/// An architecture to price: a list of named services with free-form
/// configurations.
#[derive(Debug, Default, Deserialize)]
pub struct Architecture {
    #[serde(default)]
    pub services: Vec<ArchitectureService>,
}

#[derive(Debug, Deserialize)]
pub struct ArchitectureService {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub configuration: Configuration,
}

/// Stateless monthly-cost calculator over an immutable catalog. Safe to
/// share between callers; every operation is a pure function of its inputs.
pub struct CostEstimator<'a> {
    catalog: &'a Catalog,
    region: String,
    discount_rate: f64,
}

impl<'a> CostEstimator<'a> {
    pub fn new(catalog: &'a Catalog, region: Option<&str>, discount_rate: Option<f64>) -> Self {
        Self {
            catalog,
            region: region.unwrap_or(DEFAULT_REGION).to_string(),
            discount_rate: discount_rate.unwrap_or(DEFAULT_DISCOUNT_RATE),
        }
    }

    /// Price one service under a configuration. Unknown service names are a
    /// value-level error carrying a zero estimate, not a failure.
    pub fn estimate_service_cost(
        &self,
        service: &str,
        configuration: &Configuration,
    ) -> Result<ServiceCost, OpError> {
        let Some(pricing) = self.catalog.pricing(service) else {
            return Err(
                OpError::new(format!("Pricing data not available for service: {service}"))
                    .with_service(service)
                    .with_estimated_cost(0.0),
            );
        };

        let flat: FlatConfig = typed(configuration);

        Ok(ServiceCost {
            service_name: service.to_string(),
            configuration: configuration.clone(),
            monthly_cost: monthly_cost(pricing, configuration),
            unit_cost: pricing.rate("unit", 0.0),
            units: flat.units,
            pricing_model: pricing.pricing_model.clone(),
            region: self.region.clone(),
        })
    }

    /// Sum per-service costs (skipping unpriceable entries), apply the flat
    /// discount, and derive optimizations from the pre-discount breakdown.
    pub fn calculate_total_cost(&self, architecture: &Architecture) -> Result<CostEstimate, OpError> {
        if architecture.services.is_empty() {
            return Err(OpError::new("No services provided in architecture").with_total_cost(0.0));
        }

        let mut breakdown = Vec::new();
        let mut subtotal = 0.0;
        for service in &architecture.services {
            if let Ok(cost) =
                self.estimate_service_cost(&service.service_name, &service.configuration)
            {
                subtotal += cost.monthly_cost;
                breakdown.push(cost);
            }
        }

        let discount = subtotal * self.discount_rate;
        let optimizations = self.identify_optimizations(&breakdown);

        Ok(CostEstimate {
            total_monthly_cost: subtotal - discount,
            breakdown,
            optimizations,
            discount_applied: discount,
            comparison_with_onprem: None,
        })
    }

    pub fn apply_discount(&self, base_cost: f64) -> Result<DiscountSummary, OpError> {
        if base_cost <= 0.0 {
            return Err(OpError::new("base_cost must be greater than 0"));
        }

        let discount_amount = base_cost * self.discount_rate;
        Ok(DiscountSummary {
            base_cost,
            discount_rate: self.discount_rate,
            discount_amount,
            final_cost: base_cost - discount_amount,
            discount_type: "Enterprise Discount Program".to_string(),
            savings_percentage: (self.discount_rate * 1000.0).round() / 10.0,
        })
    }

    /// Deterministic rule table keyed by billing model and configuration
    /// flags. Each rule fires independently; a single service entry may
    /// produce several optimizations. Output is sorted descending by
    /// potential savings (stable).
    pub fn identify_optimizations(&self, breakdown: &[ServiceCost]) -> Vec<CostOptimization> {
        let mut optimizations = Vec::new();

        for cost in breakdown {
            let Some(pricing) = self.catalog.pricing(&cost.service_name) else {
                continue;
            };
            let name = &cost.service_name;
            let config = &cost.configuration;
            let current = cost.monthly_cost;

            match pricing.model {
                BillingModel::InstanceHours => {
                    if config_str(config, "pricing_model").unwrap_or("On-Demand") == "On-Demand" {
                        optimizations.push(CostOptimization::saving(
                            format!("Use Reserved Instances for {name}"),
                            current,
                            0.40,
                            Effort::Low,
                            Priority::High,
                        ));
                    }
                    // "xlarge" contains "large", one check covers both
                    if config_str(config, "instance_type")
                        .unwrap_or("")
                        .contains("large")
                    {
                        optimizations.push(CostOptimization::saving(
                            format!("Right-size {name} instances based on utilization"),
                            current,
                            0.25,
                            Effort::Medium,
                            Priority::Medium,
                        ));
                    }
                }
                BillingModel::DatabaseInstance => {
                    if config_str(config, "pricing_model").unwrap_or("On-Demand") == "On-Demand" {
                        optimizations.push(CostOptimization::saving(
                            format!("Use Reserved Instances for {name}"),
                            current,
                            0.35,
                            Effort::Low,
                            Priority::High,
                        ));
                    }
                    if config_flag(config, "multi_az") {
                        optimizations.push(CostOptimization::saving(
                            format!("Disable Multi-AZ for non-production {name} instances"),
                            current,
                            0.50,
                            Effort::Low,
                            Priority::Medium,
                        ));
                    }
                }
                BillingModel::ObjectStorage => {
                    let class = config_str(config, "storage_class").unwrap_or("S3 Standard");
                    if class == "S3 Standard" {
                        optimizations.push(CostOptimization::saving(
                            "Implement lifecycle policies to transition objects to cheaper storage classes",
                            current,
                            0.30,
                            Effort::Low,
                            Priority::Medium,
                        ));
                    }
                }
                BillingModel::Serverless => {
                    if config_count(config, "memory", 1024) > 512 {
                        optimizations.push(CostOptimization::saving(
                            format!("Optimize {name} memory allocation based on actual usage"),
                            current,
                            0.20,
                            Effort::Medium,
                            Priority::Low,
                        ));
                    }
                }
                BillingModel::BlockStorage => {
                    if config_str(config, "volume_type").unwrap_or("gp3") == "gp2" {
                        optimizations.push(CostOptimization::saving(
                            format!("Migrate {name} volumes from gp2 to gp3"),
                            current,
                            0.20,
                            Effort::Low,
                            Priority::Medium,
                        ));
                    }
                }
                _ => {}
            }
        }

        optimizations.sort_by(|a, b| {
            b.potential_savings
                .partial_cmp(&a.potential_savings)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        optimizations
    }

    /// Compare monthly on-prem spend with monthly cloud spend. Breakeven is
    /// computed only when the cloud side is more expensive, from the assumed
    /// on-prem upfront capital amortized against the monthly difference.
    pub fn compare_costs(&self, onprem_cost: f64, aws_cost: f64) -> Result<CostComparison, OpError> {
        if onprem_cost < 0.0 || aws_cost < 0.0 {
            return Err(OpError::new("Costs must be non-negative"));
        }

        let difference = aws_cost - onprem_cost;
        let percentage_change = if onprem_cost > 0.0 {
            difference / onprem_cost * 100.0
        } else {
            0.0
        };

        let breakeven_months = (difference > 0.0)
            .then(|| (onprem_cost * 12.0 * ONPREM_UPFRONT_RATIO / difference) as u64);

        Ok(CostComparison {
            onprem_monthly_cost: onprem_cost,
            aws_monthly_cost: aws_cost,
            difference,
            percentage_change,
            breakeven_months,
        })
    }
}

/// Dispatch on the catalog entry's billing model. Each arm reproduces one
/// closed billing formula; configurations are parsed into typed structs with
/// documented defaults first, so a typo'd key degrades to the default rather
/// than silently pricing something else.
fn monthly_cost(pricing: &ServicePricing, configuration: &Configuration) -> f64 {
    match pricing.model {
        BillingModel::InstanceHours => {
            let c: FleetConfig = typed(configuration);
            pricing.hourly(&c.instance_type) * HOURS_PER_MONTH * c.instances as f64
        }
        BillingModel::DatabaseInstance => {
            let c: DatabaseConfig = typed(configuration);
            let instance = pricing.hourly(&c.instance_class) * HOURS_PER_MONTH;
            let storage = c.storage as f64 * pricing.rate("storage_per_gb", 0.115);
            let monthly = instance + storage;
            if c.multi_az {
                monthly * 2.0
            } else {
                monthly
            }
        }
        BillingModel::ClusterInstance => {
            let c: ClusterConfig = typed(configuration);
            let instance = pricing.hourly(&c.instance_class) * HOURS_PER_MONTH;
            let replicas = instance * c.replicas as f64;
            let storage = c.storage_gb as f64 * pricing.rate("storage_per_gb", 0.10);
            // I/O estimated at 1M requests/month
            let io = pricing.rate("io_per_million", 0.20);
            instance + replicas + storage + io
        }
        BillingModel::ReadWriteUnits => {
            let c: KeyValueConfig = typed(configuration);
            let capacity = if c.capacity_mode.eq_ignore_ascii_case("on-demand") {
                c.estimated_read_units as f64 / 1e6 * pricing.rate("on_demand_read_per_million", 0.25)
                    + c.estimated_write_units as f64 / 1e6
                        * pricing.rate("on_demand_write_per_million", 1.25)
            } else {
                c.read_capacity_units as f64
                    * pricing.rate("provisioned_read_per_hour", 0.00013)
                    * HOURS_PER_MONTH
                    + c.write_capacity_units as f64
                        * pricing.rate("provisioned_write_per_hour", 0.00065)
                        * HOURS_PER_MONTH
            };
            capacity + c.storage_gb as f64 * pricing.rate("storage_per_gb", 0.25)
        }
        BillingModel::ObjectStorage => {
            let c: ObjectStoreConfig = typed(configuration);
            let storage = c.storage_gb as f64 * pricing.storage(&c.storage_class);
            let requests =
                c.requests_per_month as f64 / 1000.0 * pricing.rate("request_per_1000", 0.0004);
            storage + requests
        }
        BillingModel::BlockStorage => {
            let c: BlockStoreConfig = typed(configuration);
            c.size as f64 * pricing.storage(&c.volume_type) * c.volumes as f64
        }
        BillingModel::FileStorage => {
            let c: FileStoreConfig = typed(configuration);
            c.storage_gb as f64 * pricing.storage(&c.storage_class)
        }
        BillingModel::Serverless => {
            let c: ServerlessConfig = typed(configuration);
            let requests =
                c.invocations_per_month as f64 / 1e6 * pricing.rate("request_per_million", 0.20);
            let gb_seconds = c.memory as f64 / 1024.0 * (c.avg_duration_ms as f64 / 1000.0)
                * c.invocations_per_month as f64;
            let compute = gb_seconds / 1e6 * pricing.rate("compute_per_million_gb_seconds", 16.67);
            requests + compute
        }
        BillingModel::LoadBalancer => {
            let c: LoadBalancerConfig = typed(configuration);
            HOURS_PER_MONTH * pricing.rate("hourly", 0.0225)
                + c.lcu_hours * pricing.rate("lcu_hour", 0.008)
        }
        BillingModel::CacheNodes => {
            let c: CacheConfig = typed(configuration);
            pricing.hourly(&c.node_type) * HOURS_PER_MONTH * c.num_nodes as f64
        }
        BillingModel::MeteredRequests => {
            let c: RequestConfig = typed(configuration);
            let free_tier = pricing.rate("free_tier", 1e6);
            let billable = (c.requests_per_month as f64 - free_tier).max(0.0);
            billable / 1e6 * pricing.rate("per_million", 0.40)
        }
        BillingModel::TieredRequests => {
            let c: RequestConfig = typed(configuration);
            let requests = c.requests_per_month as f64;
            let first_tier = pricing.rate("first_tier_per_million", 3.50);
            if requests <= 1e6 {
                requests / 1e6 * first_tier
            } else {
                first_tier + (requests - 1e6) / 1e6 * pricing.rate("next_tier_per_million", 3.00)
            }
        }
        BillingModel::BrokerStorage => {
            let c: BrokerConfig = typed(configuration);
            pricing.hourly(&c.broker_type) * HOURS_PER_MONTH * c.brokers as f64
                + c.storage_gb as f64 * pricing.rate("storage_per_gb", 0.10)
        }
        BillingModel::Flat => {
            let c: FlatConfig = typed(configuration);
            pricing.rate("base_monthly", 0.0) + pricing.rate("unit", 0.0) * c.units as f64
        }
    }
}

/// Parse a free-form configuration into a typed struct. A malformed
/// configuration falls back to the struct's documented defaults — callers
/// prefer a defaulted figure over an aborted estimate.
fn typed<T: DeserializeOwned + Default>(configuration: &Configuration) -> T {
    serde_json::from_value(Value::Object(configuration.clone())).unwrap_or_default()
}

fn config_str<'c>(configuration: &'c Configuration, key: &str) -> Option<&'c str> {
    configuration.get(key).and_then(Value::as_str)
}

fn config_flag(configuration: &Configuration, key: &str) -> bool {
    match configuration.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes"),
        _ => false,
    }
}

fn config_count(configuration: &Configuration, key: &str, default: u64) -> u64 {
    match configuration.get(key) {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)).unwrap_or(default),
        Some(Value::String(s)) => leading_u64(s).unwrap_or(default),
        _ => default,
    }
}

/// Parse the leading integer from strings like "100 GB" or "2".
fn leading_u64(s: &str) -> Option<u64> {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Accept counts as numbers or strings ("2", "100 GB", "1024 MB").
fn de_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f as u64))
            .ok_or_else(|| de::Error::custom("expected a non-negative count")),
        Value::String(s) => {
            leading_u64(&s).ok_or_else(|| de::Error::custom("expected a numeric string"))
        }
        other => Err(de::Error::custom(format!(
            "expected a count, got {other}"
        ))),
    }
}

fn de_hours<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("expected a number")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom("expected a numeric string")),
        other => Err(de::Error::custom(format!("expected hours, got {other}"))),
    }
}

fn de_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match Value::deserialize(d)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes")),
        other => Err(de::Error::custom(format!("expected a flag, got {other}"))),
    }
}

// Per-model typed configurations. Every field is optional on the wire and
// carries the documented default; unrecognized keys are ignored.

macro_rules! config_default {
    ($ty:ty { $($field:ident: $value:expr),* $(,)? }) => {
        impl Default for $ty {
            fn default() -> Self {
                Self { $($field: $value),* }
            }
        }
    };
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FleetConfig {
    instance_type: String,
    #[serde(deserialize_with = "de_count")]
    instances: u64,
}
config_default!(FleetConfig { instance_type: "t3.medium".to_string(), instances: 1 });

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DatabaseConfig {
    instance_class: String,
    #[serde(alias = "storage_gb", deserialize_with = "de_count")]
    storage: u64,
    #[serde(deserialize_with = "de_flag")]
    multi_az: bool,
}
config_default!(DatabaseConfig {
    instance_class: "db.t3.medium".to_string(),
    storage: 100,
    multi_az: false,
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ClusterConfig {
    instance_class: String,
    #[serde(alias = "storage", deserialize_with = "de_count")]
    storage_gb: u64,
    #[serde(deserialize_with = "de_count")]
    replicas: u64,
}
config_default!(ClusterConfig {
    instance_class: "db.r5.large".to_string(),
    storage_gb: 100,
    replicas: 0,
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct KeyValueConfig {
    capacity_mode: String,
    #[serde(deserialize_with = "de_count")]
    estimated_read_units: u64,
    #[serde(deserialize_with = "de_count")]
    estimated_write_units: u64,
    #[serde(deserialize_with = "de_count")]
    read_capacity_units: u64,
    #[serde(deserialize_with = "de_count")]
    write_capacity_units: u64,
    #[serde(deserialize_with = "de_count")]
    storage_gb: u64,
}
config_default!(KeyValueConfig {
    capacity_mode: "On-Demand".to_string(),
    estimated_read_units: 1_000_000,
    estimated_write_units: 500_000,
    read_capacity_units: 5,
    write_capacity_units: 5,
    storage_gb: 10,
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ObjectStoreConfig {
    #[serde(alias = "storage", deserialize_with = "de_count")]
    storage_gb: u64,
    storage_class: String,
    #[serde(deserialize_with = "de_count")]
    requests_per_month: u64,
}
config_default!(ObjectStoreConfig {
    storage_gb: 100,
    storage_class: "S3 Standard".to_string(),
    requests_per_month: 10_000,
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct BlockStoreConfig {
    volume_type: String,
    #[serde(alias = "size_gb", deserialize_with = "de_count")]
    size: u64,
    #[serde(deserialize_with = "de_count")]
    volumes: u64,
}
config_default!(BlockStoreConfig {
    volume_type: "gp3".to_string(),
    size: 100,
    volumes: 1,
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FileStoreConfig {
    #[serde(alias = "storage", deserialize_with = "de_count")]
    storage_gb: u64,
    storage_class: String,
}
config_default!(FileStoreConfig {
    storage_gb: 100,
    storage_class: "Standard".to_string(),
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ServerlessConfig {
    #[serde(alias = "memory_mb", deserialize_with = "de_count")]
    memory: u64,
    #[serde(deserialize_with = "de_count")]
    invocations_per_month: u64,
    #[serde(deserialize_with = "de_count")]
    avg_duration_ms: u64,
}
config_default!(ServerlessConfig {
    memory: 1024,
    invocations_per_month: 1_000_000,
    avg_duration_ms: 200,
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LoadBalancerConfig {
    #[serde(deserialize_with = "de_hours")]
    lcu_hours: f64,
}
config_default!(LoadBalancerConfig { lcu_hours: 730.0 });

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CacheConfig {
    node_type: String,
    #[serde(deserialize_with = "de_count")]
    num_nodes: u64,
}
config_default!(CacheConfig {
    node_type: "cache.t3.medium".to_string(),
    num_nodes: 1,
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RequestConfig {
    #[serde(deserialize_with = "de_count")]
    requests_per_month: u64,
}
config_default!(RequestConfig { requests_per_month: 1_000_000 });

#[derive(Debug, Deserialize)]
#[serde(default)]
struct BrokerConfig {
    #[serde(alias = "broker_instance_type")]
    broker_type: String,
    #[serde(alias = "brokers_per_az", deserialize_with = "de_count")]
    brokers: u64,
    #[serde(deserialize_with = "de_count")]
    storage_gb: u64,
}
config_default!(BrokerConfig {
    broker_type: "kafka.m5.large".to_string(),
    brokers: 3,
    storage_gb: 100,
});

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FlatConfig {
    #[serde(deserialize_with = "de_count")]
    units: u64,
}
config_default!(FlatConfig { units: 1 });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::round2;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    fn config(v: serde_json::Value) -> Configuration {
        v.as_object().cloned().unwrap_or_default()
    }

    fn estimator(catalog: &Catalog) -> CostEstimator<'_> {
        CostEstimator::new(catalog, None, None)
    }

    #[test]
    fn ec2_two_mediums() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let cost = est
            .estimate_service_cost(
                "Amazon EC2",
                &config(json!({"instance_type": "t3.medium", "instances": 2})),
            )
            .unwrap();
        assert!((cost.monthly_cost - 0.0416 * 730.0 * 2.0).abs() < 1e-9);
        assert_eq!(cost.region, "us-east-1");
        assert_eq!(cost.pricing_model, "Per hour");
    }

    #[test]
    fn ec2_unknown_instance_type_uses_default_rate() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let cost = est
            .estimate_service_cost(
                "Amazon EC2",
                &config(json!({"instance_type": "z9.mega"})),
            )
            .unwrap();
        assert!((cost.monthly_cost - 0.05 * 730.0).abs() < 1e-9);
    }

    #[test]
    fn string_counts_are_tolerated() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let cost = est
            .estimate_service_cost(
                "Amazon EC2",
                &config(json!({"instance_type": "t3.medium", "instances": "2"})),
            )
            .unwrap();
        assert!((cost.monthly_cost - 0.0416 * 730.0 * 2.0).abs() < 1e-9);

        let cost = est
            .estimate_service_cost(
                "Amazon RDS",
                &config(json!({"instance_class": "db.t3.medium", "storage": "100 GB"})),
            )
            .unwrap();
        assert!((cost.monthly_cost - (0.068 * 730.0 + 100.0 * 0.115)).abs() < 1e-9);
    }

    #[test]
    fn unknown_service_is_a_value_error() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let err = est
            .estimate_service_cost("Amazon QLDB", &Configuration::new())
            .unwrap_err();
        assert!(err.error.contains("Amazon QLDB"));
        assert_eq!(err.estimated_monthly_cost, Some(0.0));
        assert_eq!(err.service.as_deref(), Some("Amazon QLDB"));
    }

    #[test]
    fn multi_az_doubles_database_cost() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let single = est
            .estimate_service_cost("Amazon RDS", &config(json!({"multi_az": false})))
            .unwrap();
        let double = est
            .estimate_service_cost("Amazon RDS", &config(json!({"multi_az": true})))
            .unwrap();
        assert!((double.monthly_cost - single.monthly_cost * 2.0).abs() < 1e-9);
    }

    #[test]
    fn aurora_includes_replicas_storage_and_io() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let cost = est
            .estimate_service_cost(
                "Amazon Aurora",
                &config(json!({"instance_class": "db.r5.large", "replicas": 2, "storage_gb": 200})),
            )
            .unwrap();
        let expected = 0.29 * 730.0 * 3.0 + 200.0 * 0.10 + 0.20;
        assert!((cost.monthly_cost - expected).abs() < 1e-9);
    }

    #[test]
    fn dynamodb_capacity_modes() {
        let catalog = catalog();
        let est = estimator(&catalog);

        let on_demand = est
            .estimate_service_cost("Amazon DynamoDB", &Configuration::new())
            .unwrap();
        // 1M reads + 0.5M writes + 10 GB storage
        let expected = 0.25 + 0.5 * 1.25 + 10.0 * 0.25;
        assert!((on_demand.monthly_cost - expected).abs() < 1e-9);

        let provisioned = est
            .estimate_service_cost(
                "Amazon DynamoDB",
                &config(json!({"capacity_mode": "Provisioned"})),
            )
            .unwrap();
        let expected = 5.0 * 0.00013 * 730.0 + 5.0 * 0.00065 * 730.0 + 10.0 * 0.25;
        assert!((provisioned.monthly_cost - expected).abs() < 1e-9);
    }

    #[test]
    fn lambda_request_plus_compute() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let cost = est
            .estimate_service_cost(
                "AWS Lambda",
                &config(json!({"memory": 1024, "invocations_per_month": 2_000_000, "avg_duration_ms": 500})),
            )
            .unwrap();
        let gb_seconds = 1.0 * 0.5 * 2_000_000.0;
        let expected = 2.0 * 0.20 + gb_seconds / 1e6 * 16.67;
        assert!((cost.monthly_cost - expected).abs() < 1e-9);
    }

    #[test]
    fn metered_requests_respect_free_tier() {
        let catalog = catalog();
        let est = estimator(&catalog);

        let free = est
            .estimate_service_cost(
                "Amazon SQS",
                &config(json!({"requests_per_month": 1_000_000})),
            )
            .unwrap();
        assert_eq!(free.monthly_cost, 0.0);

        let billed = est
            .estimate_service_cost(
                "Amazon SQS",
                &config(json!({"requests_per_month": 3_000_000})),
            )
            .unwrap();
        assert!((billed.monthly_cost - 2.0 * 0.40).abs() < 1e-9);
    }

    #[test]
    fn api_gateway_tiers() {
        let catalog = catalog();
        let est = estimator(&catalog);

        let first = est
            .estimate_service_cost(
                "Amazon API Gateway",
                &config(json!({"requests_per_month": 500_000})),
            )
            .unwrap();
        assert!((first.monthly_cost - 0.5 * 3.50).abs() < 1e-9);

        let both = est
            .estimate_service_cost(
                "Amazon API Gateway",
                &config(json!({"requests_per_month": 3_000_000})),
            )
            .unwrap();
        assert!((both.monthly_cost - (3.50 + 2.0 * 3.00)).abs() < 1e-9);
    }

    #[test]
    fn msk_brokers_plus_storage() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let cost = est
            .estimate_service_cost(
                "Amazon MSK",
                &config(json!({"broker_type": "kafka.m5.large", "brokers": 3, "storage_gb": 100})),
            )
            .unwrap();
        let expected = 0.21 * 730.0 * 3.0 + 100.0 * 0.10;
        assert!((cost.monthly_cost - expected).abs() < 1e-9);
    }

    #[test]
    fn total_cost_applies_discount_and_skips_unknowns() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let architecture: Architecture = serde_json::from_value(json!({
            "services": [
                {"service_name": "Amazon S3", "configuration": {
                    "storage_gb": 100, "storage_class": "S3 Standard", "requests_per_month": 10000
                }},
                {"service_name": "Not A Service", "configuration": {}}
            ]
        }))
        .unwrap();

        let estimate = est.calculate_total_cost(&architecture).unwrap();
        assert_eq!(estimate.breakdown.len(), 1);

        let raw = 100.0 * 0.023 + 10.0 * 0.0004;
        assert!((estimate.total_monthly_cost - raw * 0.9).abs() < 1e-9);
        assert_eq!(round2(estimate.total_monthly_cost), 2.07);
        assert!((estimate.discount_applied - raw * 0.1).abs() < 1e-9);
        // S3 Standard triggers the lifecycle rule on the raw breakdown
        assert_eq!(estimate.optimizations.len(), 1);
        assert!((estimate.optimizations[0].current_cost - raw).abs() < 1e-9);
    }

    #[test]
    fn empty_architecture_is_rejected() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let err = est.calculate_total_cost(&Architecture::default()).unwrap_err();
        assert!(err.error.contains("No services"));
        assert_eq!(err.total_monthly_cost, Some(0.0));
    }

    #[test]
    fn discount_math_and_rejection() {
        let catalog = catalog();
        let est = estimator(&catalog);

        let summary = est.apply_discount(1000.0).unwrap();
        assert_eq!(summary.discount_amount, 100.0);
        assert_eq!(summary.final_cost, 900.0);
        assert_eq!(summary.savings_percentage, 10.0);
        assert_eq!(round2(summary.final_cost), round2(1000.0 * 0.9));

        assert!(est.apply_discount(0.0).is_err());
        assert!(est.apply_discount(-5.0).is_err());
    }

    #[test]
    fn optimizations_sorted_and_consistent() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let architecture: Architecture = serde_json::from_value(json!({
            "services": [
                {"service_name": "Amazon EC2", "configuration": {"instance_type": "m5.xlarge", "instances": 4}},
                {"service_name": "Amazon RDS", "configuration": {"multi_az": true}},
                {"service_name": "Amazon EBS", "configuration": {"volume_type": "gp2", "size": 500}},
                {"service_name": "AWS Lambda", "configuration": {"memory": 2048}}
            ]
        }))
        .unwrap();

        let estimate = est.calculate_total_cost(&architecture).unwrap();
        let opts = &estimate.optimizations;
        // EC2 fires twice (RI + right-sizing), RDS twice, EBS once, Lambda once
        assert_eq!(opts.len(), 6);
        for pair in opts.windows(2) {
            assert!(pair[0].potential_savings >= pair[1].potential_savings);
        }
        for opt in opts {
            assert!(opt.potential_savings >= 0.0);
            assert!((opt.optimized_cost - (opt.current_cost - opt.potential_savings)).abs() < 1e-9);
        }
    }

    #[test]
    fn breakeven_only_when_cloud_costs_more() {
        let catalog = catalog();
        let est = estimator(&catalog);

        let cheaper = est.compare_costs(1000.0, 800.0).unwrap();
        assert_eq!(cheaper.breakeven_months, None);
        assert_eq!(cheaper.difference, -200.0);
        assert_eq!(cheaper.percentage_change, -20.0);

        let pricier = est.compare_costs(1000.0, 1100.0).unwrap();
        // upfront = 1000 * 12 * 0.2 = 2400; 2400 / 100 = 24 months
        assert_eq!(pricier.breakeven_months, Some(24));

        let zero_base = est.compare_costs(0.0, 100.0).unwrap();
        assert_eq!(zero_base.percentage_change, 0.0);

        assert!(est.compare_costs(-1.0, 100.0).is_err());
    }

    #[test]
    fn malformed_configuration_falls_back_to_defaults() {
        let catalog = catalog();
        let est = estimator(&catalog);
        let defaulted = est
            .estimate_service_cost(
                "Amazon EC2",
                &config(json!({"instance_type": 42, "instances": {"bad": true}})),
            )
            .unwrap();
        assert!((defaulted.monthly_cost - 0.0416 * 730.0).abs() < 1e-9);
    }
}
