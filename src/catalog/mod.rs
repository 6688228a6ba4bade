mod builtin;
mod remote;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Closed set of billing models the estimator knows how to price. Every
/// catalog entry carries one; the estimator dispatches on the tag rather
/// than on service-name strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingModel {
    /// Hourly rate × 730 × instance count (EC2).
    InstanceHours,
    /// Instance hours + per-GB storage, doubled for Multi-AZ (RDS).
    DatabaseInstance,
    /// Primary + replica instance hours + storage + flat I/O estimate (Aurora).
    ClusterInstance,
    /// On-demand read/write units or provisioned capacity, + storage (DynamoDB).
    ReadWriteUnits,
    /// Per-GB by storage class + per-1000 requests (S3).
    ObjectStorage,
    /// Per-GB by volume type × volume count (EBS).
    BlockStorage,
    /// Per-GB by storage class (EFS).
    FileStorage,
    /// Per-million requests + GB-second compute (Lambda).
    Serverless,
    /// Fixed hourly + LCU hours (ALB/NLB).
    LoadBalancer,
    /// Node hourly rate × 730 × node count (ElastiCache).
    CacheNodes,
    /// Per-million requests above a free tier (SQS/SNS).
    MeteredRequests,
    /// Two-tier per-million request pricing (API Gateway).
    TieredRequests,
    /// Broker hours × broker count + per-GB storage (MSK).
    BrokerStorage,
    /// base_monthly + unit × units; also the fallback (Elastic Beanstalk).
    Flat,
}

/// Pricing catalog entry for one service: a billing model tag plus rate
/// tables. Lookups for unknown keys fall back to the entry's default rate,
/// never fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePricing {
    pub model: BillingModel,
    /// Human-readable billing description ("Per hour + storage").
    #[serde(default)]
    pub pricing_model: String,
    /// Hourly rate per instance/node/broker type.
    #[serde(default)]
    pub hourly_rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub default_hourly_rate: f64,
    /// Per-GB-month rate per storage class / volume type.
    #[serde(default)]
    pub storage_rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub default_storage_rate: f64,
    /// Named scalar rates specific to the billing model.
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

impl ServicePricing {
    pub fn hourly(&self, key: &str) -> f64 {
        self.hourly_rates
            .get(key)
            .copied()
            .unwrap_or(self.default_hourly_rate)
    }

    pub fn storage(&self, key: &str) -> f64 {
        self.storage_rates
            .get(key)
            .copied()
            .unwrap_or(self.default_storage_rate)
    }

    pub fn rate(&self, key: &str, fallback: f64) -> f64 {
        self.rates.get(key).copied().unwrap_or(fallback)
    }
}

/// Knowledge catalog entry: the static facts the recommender serves for
/// comparisons, details, and doc queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pricing_model: String,
    #[serde(default)]
    pub management_level: String,
    #[serde(default)]
    pub scalability: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub documentation_link: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Partial catalog fetched from a remote source, merged over the builtin
/// tables. Any section may be absent.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogOverlay {
    #[serde(default)]
    pub pricing: BTreeMap<String, ServicePricing>,
    #[serde(default)]
    pub knowledge: BTreeMap<String, ServiceInfo>,
    #[serde(default)]
    pub approved: Vec<String>,
}

/// Read-only pricing + knowledge catalog. Built once at startup and shared
/// by reference between the estimator and the recommender.
pub struct Catalog {
    pricing: BTreeMap<String, ServicePricing>,
    knowledge: BTreeMap<String, ServiceInfo>,
    approved: HashSet<String>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            pricing: builtin::pricing(),
            knowledge: builtin::knowledge(),
            approved: builtin::approved().into_iter().collect(),
        }
    }

    pub fn pricing(&self, service: &str) -> Option<&ServicePricing> {
        self.pricing.get(service)
    }

    pub fn info(&self, service: &str) -> Option<&ServiceInfo> {
        self.knowledge.get(service)
    }

    pub fn is_approved(&self, service: &str) -> bool {
        self.approved.contains(service)
    }

    /// Service names in the knowledge catalog, sorted.
    pub fn known_services(&self) -> Vec<String> {
        self.knowledge.keys().cloned().collect()
    }

    /// Name-sorted iteration over knowledge entries, for deterministic
    /// doc-query output.
    pub fn knowledge_iter(&self) -> impl Iterator<Item = (&String, &ServiceInfo)> {
        self.knowledge.iter()
    }

    /// Merge a remote overlay over the builtin tables. Overlay entries win
    /// per service name; the approved list is additive.
    pub fn merge(&mut self, overlay: CatalogOverlay) {
        for (name, entry) in overlay.pricing {
            self.pricing.insert(name, entry);
        }
        for (name, entry) in overlay.knowledge {
            self.knowledge.insert(name, entry);
        }
        self.approved.extend(overlay.approved);
    }
}

/// Build the catalog for this run: builtin tables plus, when a catalog URL
/// is configured, the remote overlay (cached, TTL-guarded). Remote failures
/// degrade to the builtin catalog with a warning — pricing lookups must
/// never abort the run.
pub fn load(config: &Config, offline: bool) -> Catalog {
    let mut catalog = Catalog::builtin();

    if let Some(ref url) = config.catalog_url {
        match remote::load_overlay(url, offline) {
            Ok(overlay) => catalog.merge(overlay),
            Err(e) => eprintln!("Warning: remote catalog unavailable: {e}"),
        }
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rates_are_non_negative() {
        let catalog = Catalog::builtin();
        for (name, entry) in &catalog.pricing {
            for (key, rate) in entry.hourly_rates.iter().chain(&entry.storage_rates) {
                assert!(*rate >= 0.0, "{name}/{key} has a negative rate");
            }
            for (key, rate) in &entry.rates {
                assert!(*rate >= 0.0, "{name}/{key} has a negative rate");
            }
            assert!(entry.default_hourly_rate >= 0.0);
            assert!(entry.default_storage_rate >= 0.0);
        }
    }

    #[test]
    fn unknown_keys_fall_back_to_defaults() {
        let catalog = Catalog::builtin();
        let ec2 = catalog.pricing("Amazon EC2").unwrap();
        assert_eq!(ec2.hourly("no-such-type"), ec2.default_hourly_rate);
        assert_eq!(ec2.hourly("t3.medium"), 0.0416);

        let s3 = catalog.pricing("Amazon S3").unwrap();
        assert_eq!(s3.storage("made-up-class"), 0.023);
    }

    #[test]
    fn approved_list_covers_recommended_services() {
        let catalog = Catalog::builtin();
        for name in [
            "Amazon EC2",
            "AWS Lambda",
            "Amazon RDS",
            "Amazon Aurora",
            "Amazon DynamoDB",
            "Amazon S3",
            "Amazon MSK",
            "Amazon ElastiCache",
        ] {
            assert!(catalog.is_approved(name), "{name} should be approved");
        }
        assert!(!catalog.is_approved("Manual Review Required"));
    }

    #[test]
    fn overlay_wins_per_entry_and_approvals_are_additive() {
        let mut catalog = Catalog::builtin();
        let overlay: CatalogOverlay = serde_json::from_value(serde_json::json!({
            "pricing": {
                "Amazon EC2": {
                    "model": "instance_hours",
                    "pricing_model": "Per hour",
                    "hourly_rates": { "t3.medium": 0.05 },
                    "default_hourly_rate": 0.05
                }
            },
            "approved": ["Example Service"]
        }))
        .unwrap();
        catalog.merge(overlay);

        assert_eq!(catalog.pricing("Amazon EC2").unwrap().hourly("t3.medium"), 0.05);
        // Untouched entries survive the merge.
        assert!(catalog.pricing("Amazon S3").is_some());
        assert!(catalog.is_approved("Example Service"));
        assert!(catalog.is_approved("Amazon RDS"));
    }
}
