use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::types::{
    ComparisonDetails, ComparisonEntry, Configuration, OpError, ServiceComparison,
    ServiceDetails, ServiceOption,
};

/// Component categories the recommender can dispatch on. Anything it does
/// not recognize deserializes to `Unknown` and gets the manual-review
/// placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Compute,
    Database,
    Storage,
    Network,
    Messaging,
    Analytics,
    Security,
    Management,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Closed technology tag resolved once from the descriptor's free-text
/// technology field. Matching is case-insensitive substring, first hit wins,
/// in this order: cache engines, kafka, named relational engines, named
/// NoSQL engines, bare "sql", tomcat, load balancers, gateways/APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technology {
    Cache,
    Kafka,
    Relational,
    NoSql,
    GenericSql,
    Tomcat,
    LoadBalancer,
    ApiGateway,
    Other,
}

impl Technology {
    pub fn classify(raw: &str) -> Self {
        let t = raw.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| t.contains(n));

        if has(&["redis", "memcached"]) {
            Technology::Cache
        } else if has(&["kafka"]) {
            Technology::Kafka
        } else if has(&["mysql", "postgresql", "postgres", "oracle", "sql server", "mariadb"]) {
            Technology::Relational
        } else if has(&["mongodb", "cassandra", "dynamodb"]) {
            Technology::NoSql
        } else if has(&["sql"]) {
            Technology::GenericSql
        } else if has(&["tomcat"]) {
            Technology::Tomcat
        } else if has(&["load balancer", "lb"]) {
            Technology::LoadBalancer
        } else if has(&["gateway", "api"]) {
            Technology::ApiGateway
        } else {
            Technology::Other
        }
    }
}

/// Component descriptor: what the caller wants a service recommendation for.
#[derive(Debug, Deserialize)]
pub struct Component {
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(default, rename = "type")]
    pub component_type: ComponentType,
    #[serde(default = "unknown_technology")]
    pub technology: String,
    #[serde(default)]
    pub specifications: Configuration,
}

fn unknown_name() -> String {
    "Unknown Component".to_string()
}

fn unknown_technology() -> String {
    "Unknown".to_string()
}

/// Outcome of a documentation query: matched services or a refinement hint.
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum DocsResult {
    Matches {
        query: String,
        relevant_services: Vec<DocMatch>,
        count: usize,
    },
    NoMatch {
        response: String,
        suggestion: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct DocMatch {
    pub service: String,
    pub description: String,
    pub use_cases: Vec<String>,
    pub documentation_link: String,
}

/// Stateless service recommender over the immutable knowledge catalog.
pub struct ServiceRecommender<'a> {
    catalog: &'a Catalog,
}

impl<'a> ServiceRecommender<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Ranked service options for a component, dispatched by component type
    /// with the technology tag selecting between variants.
    pub fn recommend(&self, component: &Component) -> Vec<ServiceOption> {
        let tech = Technology::classify(&component.technology);
        let candidates = match component.component_type {
            ComponentType::Compute => self.compute_options(tech),
            ComponentType::Database => self.database_options(tech),
            ComponentType::Storage => self.storage_options(),
            ComponentType::Network => self.network_options(tech),
            ComponentType::Messaging => self.messaging_options(tech),
            _ => vec![self.manual_review_option()],
        };
        self.rank(candidates)
    }

    /// Stable ascending sort by rank, then a single boost pass: approved
    /// options ranked worse than 1 move up one slot (clamped at 1), then a
    /// stable re-sort. Idempotent once every approved option sits at rank 1
    /// or was already boosted; ties keep insertion order.
    pub fn rank(&self, mut options: Vec<ServiceOption>) -> Vec<ServiceOption> {
        options.sort_by_key(|o| o.rank);

        for option in &mut options {
            if option.approved && option.rank > 1 {
                option.rank -= 1;
            }
        }

        options.sort_by_key(|o| o.rank);
        options
    }

    /// Compare named services out of the knowledge catalog. Unknown names
    /// become per-service error entries; the recommendation is the first
    /// highest-scoring service in input order (+10 approved, +5 fully
    /// managed, -1 unknown).
    pub fn compare(&self, services: &[String]) -> Result<ServiceComparison, OpError> {
        if services.len() < 2 {
            return Err(OpError::new("At least 2 services required for comparison"));
        }

        let mut matrix = BTreeMap::new();
        for name in services {
            let entry = match self.catalog.info(name) {
                Some(info) => ComparisonEntry::Known(ComparisonDetails {
                    description: info.description.clone(),
                    pricing_model: info.pricing_model.clone(),
                    management_level: info.management_level.clone(),
                    scalability: info.scalability.clone(),
                    use_cases: info.use_cases.clone(),
                    pros: info.pros.clone(),
                    cons: info.cons.clone(),
                    approved: self.catalog.is_approved(name),
                }),
                None => ComparisonEntry::Missing {
                    error: format!("Service {name} not found in catalog"),
                },
            };
            matrix.insert(name.clone(), entry);
        }

        let (recommendation, reasoning) = self.comparison_recommendation(services, &matrix);

        Ok(ServiceComparison {
            services: services.to_vec(),
            comparison_matrix: matrix,
            recommendation,
            reasoning,
        })
    }

    fn comparison_recommendation(
        &self,
        services: &[String],
        matrix: &BTreeMap<String, ComparisonEntry>,
    ) -> (String, String) {
        let score = |name: &String| -> i32 {
            match matrix.get(name) {
                Some(ComparisonEntry::Known(details)) => {
                    let mut score = 0;
                    if details.approved {
                        score += 10;
                    }
                    if details.management_level == "Fully Managed" {
                        score += 5;
                    }
                    score
                }
                _ => -1,
            }
        };

        // Strict comparison keeps the first of tied scores, so ties resolve
        // deterministically by input order.
        let mut best = &services[0];
        let mut best_score = score(best);
        for name in &services[1..] {
            let s = score(name);
            if s > best_score {
                best = name;
                best_score = s;
            }
        }

        let mut reasons = Vec::new();
        if let Some(ComparisonEntry::Known(details)) = matrix.get(best) {
            if details.approved {
                reasons.push("approved status");
            }
            if details.management_level == "Fully Managed" {
                reasons.push("fully managed service");
            }
        }
        let reasoning = if reasons.is_empty() {
            format!("{best} is recommended based on overall suitability")
        } else {
            format!("{best} is recommended based on {}", reasons.join(" and "))
        };

        (best.clone(), reasoning)
    }

    pub fn get_details(&self, service_name: &str) -> Result<ServiceDetails, OpError> {
        let Some(info) = self.catalog.info(service_name) else {
            return Err(
                OpError::new(format!("Service {service_name} not found in catalog"))
                    .with_available_services(self.catalog.known_services()),
            );
        };

        Ok(ServiceDetails {
            service_name: service_name.to_string(),
            description: info.description.clone(),
            features: info.features.clone(),
            use_cases: info.use_cases.clone(),
            pricing_model: info.pricing_model.clone(),
            management_level: info.management_level.clone(),
            scalability: info.scalability.clone(),
            pros: info.pros.clone(),
            cons: info.cons.clone(),
            documentation_link: info.documentation_link.clone(),
            approved: self.catalog.is_approved(service_name),
        })
    }

    /// Case-insensitive substring search across service names, descriptions,
    /// and keyword lists. Matches come back in name order.
    pub fn query_docs(&self, query: &str) -> DocsResult {
        let query_lower = query.to_lowercase();

        let matches: Vec<DocMatch> = self
            .catalog
            .knowledge_iter()
            .filter(|(name, info)| {
                query_lower.contains(&name.to_lowercase())
                    || info.description.to_lowercase().contains(&query_lower)
                    || info.keywords.iter().any(|k| query_lower.contains(k))
            })
            .map(|(name, info)| DocMatch {
                service: name.clone(),
                description: info.description.clone(),
                use_cases: info.use_cases.clone(),
                documentation_link: info.documentation_link.clone(),
            })
            .collect();

        if matches.is_empty() {
            return DocsResult::NoMatch {
                response:
                    "No specific service information found for your query. Please refine your question."
                        .to_string(),
                suggestion: "Try asking about specific services like EC2, RDS, S3, Lambda, etc."
                    .to_string(),
            };
        }

        DocsResult::Matches {
            query: query.to_string(),
            count: matches.len(),
            relevant_services: matches,
        }
    }

    fn option(
        &self,
        service_name: &str,
        configuration: Value,
        pros: &[&str],
        cons: &[&str],
        estimated_monthly_cost: f64,
        rank: u32,
        documentation_links: &[&str],
        use_cases: &[&str],
    ) -> ServiceOption {
        ServiceOption {
            service_name: service_name.to_string(),
            configuration: configuration.as_object().cloned().unwrap_or_default(),
            pros: pros.iter().map(|s| s.to_string()).collect(),
            cons: cons.iter().map(|s| s.to_string()).collect(),
            estimated_monthly_cost,
            rank,
            approved: self.catalog.is_approved(service_name),
            documentation_links: documentation_links.iter().map(|s| s.to_string()).collect(),
            use_cases: use_cases.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn compute_options(&self, tech: Technology) -> Vec<ServiceOption> {
        let platform = if tech == Technology::Tomcat {
            "Java with Tomcat"
        } else {
            "Python"
        };

        vec![
            self.option(
                "Amazon EC2",
                json!({
                    "instance_type": "t3.xlarge",
                    "vcpu": 4,
                    "memory": "16 GB",
                    "storage": "EBS gp3"
                }),
                &[
                    "Full control over instance configuration",
                    "Wide range of instance types",
                    "Flexible pricing options (On-Demand, Reserved, Spot)",
                    "Supports all operating systems and applications",
                ],
                &[
                    "Requires manual management and patching",
                    "Higher operational overhead",
                    "Need to manage scaling manually or with Auto Scaling",
                ],
                120.0,
                2,
                &["https://docs.aws.amazon.com/ec2/"],
                &["Legacy applications", "Custom configurations", "Long-running workloads"],
            ),
            self.option(
                "AWS Elastic Beanstalk",
                json!({
                    "platform": platform,
                    "instance_type": "t3.medium",
                    "auto_scaling": "enabled"
                }),
                &[
                    "Managed platform with automatic scaling",
                    "Easy deployment and updates",
                    "Built-in monitoring and health checks",
                    "Supports multiple languages and frameworks",
                ],
                &[
                    "Less control than EC2",
                    "Platform limitations",
                    "May not support all custom configurations",
                ],
                150.0,
                1,
                &["https://docs.aws.amazon.com/elasticbeanstalk/"],
                &["Web applications", "API backends", "Microservices"],
            ),
            self.option(
                "AWS Lambda",
                json!({
                    "memory": "1024 MB",
                    "timeout": "15 minutes",
                    "runtime": "Python 3.11"
                }),
                &[
                    "Serverless - no infrastructure management",
                    "Pay only for execution time",
                    "Automatic scaling",
                    "Integrated with AWS services",
                ],
                &[
                    "Cold start latency",
                    "15-minute execution limit",
                    "Stateless execution model",
                    "May require application refactoring",
                ],
                50.0,
                3,
                &["https://docs.aws.amazon.com/lambda/"],
                &["Event-driven workloads", "APIs", "Batch processing", "Microservices"],
            ),
        ]
    }

    fn database_options(&self, tech: Technology) -> Vec<ServiceOption> {
        let mut options = Vec::new();
        let relational = matches!(tech, Technology::Relational | Technology::GenericSql);

        if relational {
            options.push(self.option(
                "Amazon RDS",
                json!({
                    "engine": "PostgreSQL",
                    "instance_class": "db.r5.large",
                    "storage": "100 GB gp3",
                    "multi_az": true
                }),
                &[
                    "Managed relational database",
                    "Automated backups and patching",
                    "Multi-AZ for high availability",
                    "Read replicas for scaling",
                ],
                &[
                    "Less control than self-managed",
                    "Some features may not be available",
                    "Costs can be higher than self-managed databases",
                ],
                280.0,
                1,
                &["https://docs.aws.amazon.com/rds/"],
                &["Transactional workloads", "OLTP", "Traditional applications"],
            ));
            options.push(self.option(
                "Amazon Aurora",
                json!({
                    "engine": "Aurora PostgreSQL",
                    "instance_class": "db.r5.large",
                    "storage": "Auto-scaling",
                    "replicas": 2
                }),
                &[
                    "High performance (5x MySQL, 3x PostgreSQL)",
                    "Auto-scaling storage",
                    "Up to 15 read replicas",
                    "Continuous backup to S3",
                ],
                &[
                    "Higher cost than RDS",
                    "MySQL/PostgreSQL compatibility only",
                    "Vendor lock-in",
                ],
                400.0,
                2,
                &["https://docs.aws.amazon.com/aurora/"],
                &[
                    "High-performance applications",
                    "Large-scale databases",
                    "Read-heavy workloads",
                ],
            ));
        }

        if !matches!(tech, Technology::Relational) {
            options.push(self.option(
                "Amazon DynamoDB",
                json!({
                    "capacity_mode": "On-Demand",
                    "encryption": "enabled",
                    "point_in_time_recovery": true
                }),
                &[
                    "Fully managed NoSQL",
                    "Single-digit millisecond latency",
                    "Automatic scaling",
                    "Built-in security and backup",
                ],
                &[
                    "Different data model than relational",
                    "Query limitations",
                    "Requires data modeling expertise",
                ],
                200.0,
                if tech == Technology::NoSql { 1 } else { 3 },
                &["https://docs.aws.amazon.com/dynamodb/"],
                &[
                    "High-scale applications",
                    "Real-time applications",
                    "Serverless architectures",
                ],
            ));
        }

        if tech == Technology::Cache {
            options.push(self.option(
                "Amazon ElastiCache",
                json!({
                    "engine": "Redis",
                    "node_type": "cache.r5.large",
                    "num_nodes": 2
                }),
                &[
                    "Managed in-memory cache",
                    "Sub-millisecond latency",
                    "Supports Redis and Memcached",
                    "Automatic failover",
                ],
                &[
                    "In-memory only (volatile)",
                    "Cost for high memory requirements",
                    "Requires cache strategy",
                ],
                180.0,
                1,
                &["https://docs.aws.amazon.com/elasticache/"],
                &["Session storage", "Caching layer", "Real-time analytics"],
            ));
        }

        options
    }

    fn storage_options(&self) -> Vec<ServiceOption> {
        vec![
            self.option(
                "Amazon S3",
                json!({
                    "storage_class": "S3 Standard",
                    "versioning": "enabled",
                    "encryption": "SSE-S3"
                }),
                &[
                    "Highly durable (99.999999999%)",
                    "Unlimited scalability",
                    "Multiple storage classes for cost optimization",
                    "Integrated with most AWS services",
                ],
                &[
                    "Object storage (not file system)",
                    "Eventual consistency for some operations",
                    "Requires application changes for file system workloads",
                ],
                50.0,
                1,
                &["https://docs.aws.amazon.com/s3/"],
                &["Object storage", "Backups", "Data lakes", "Static websites"],
            ),
            self.option(
                "Amazon EFS",
                json!({
                    "performance_mode": "General Purpose",
                    "throughput_mode": "Bursting",
                    "storage_class": "Standard"
                }),
                &[
                    "Fully managed NFS file system",
                    "Elastic scaling",
                    "Multi-AZ availability",
                    "POSIX-compliant",
                ],
                &[
                    "Higher cost than S3",
                    "Performance depends on size",
                    "Linux only",
                ],
                150.0,
                2,
                &["https://docs.aws.amazon.com/efs/"],
                &[
                    "Shared file storage",
                    "Content management",
                    "Web serving",
                    "Container storage",
                ],
            ),
            self.option(
                "Amazon EBS",
                json!({
                    "volume_type": "gp3",
                    "size": "100 GB",
                    "iops": 3000
                }),
                &[
                    "Block storage for EC2",
                    "High performance",
                    "Snapshots for backup",
                    "Multiple volume types",
                ],
                &[
                    "Attached to single EC2 instance",
                    "AZ-specific",
                    "Requires EC2 instance",
                ],
                10.0,
                3,
                &["https://docs.aws.amazon.com/ebs/"],
                &["EC2 instance storage", "Databases on EC2", "Boot volumes"],
            ),
        ]
    }

    fn network_options(&self, tech: Technology) -> Vec<ServiceOption> {
        let mut options = Vec::new();

        if tech == Technology::LoadBalancer {
            options.push(self.option(
                "Application Load Balancer",
                json!({
                    "scheme": "internet-facing",
                    "ip_address_type": "ipv4",
                    "cross_zone": true
                }),
                &[
                    "Layer 7 load balancing",
                    "Content-based routing",
                    "WebSocket support",
                    "Integrated with AWS services",
                ],
                &[
                    "Higher cost than NLB",
                    "Not suitable for TCP/UDP",
                    "Adds latency",
                ],
                25.0,
                1,
                &["https://docs.aws.amazon.com/elasticloadbalancing/"],
                &["HTTP/HTTPS applications", "Microservices", "Container applications"],
            ));
            options.push(self.option(
                "Network Load Balancer",
                json!({
                    "scheme": "internet-facing",
                    "ip_address_type": "ipv4",
                    "cross_zone": true
                }),
                &[
                    "Layer 4 load balancing",
                    "Ultra-low latency",
                    "Static IP support",
                    "Millions of requests per second",
                ],
                &[
                    "No content-based routing",
                    "Less features than ALB",
                    "Higher cost for low traffic",
                ],
                25.0,
                2,
                &["https://docs.aws.amazon.com/elasticloadbalancing/"],
                &["TCP/UDP applications", "High performance", "Static IP requirements"],
            ));
        }

        if tech == Technology::ApiGateway {
            options.push(self.option(
                "Amazon API Gateway",
                json!({
                    "type": "REST API",
                    "endpoint_type": "Regional",
                    "throttling": "enabled"
                }),
                &[
                    "Fully managed API service",
                    "Built-in authentication",
                    "Request/response transformation",
                    "Integrated with Lambda",
                ],
                &["Cost per request", "29-second timeout", "Learning curve"],
                35.0,
                1,
                &["https://docs.aws.amazon.com/apigateway/"],
                &["REST APIs", "WebSocket APIs", "Serverless backends"],
            ));
        }

        options
    }

    fn messaging_options(&self, tech: Technology) -> Vec<ServiceOption> {
        let mut options = vec![
            self.option(
                "Amazon SQS",
                json!({
                    "queue_type": "Standard",
                    "message_retention": "4 days",
                    "visibility_timeout": "30 seconds"
                }),
                &[
                    "Fully managed message queue",
                    "Unlimited throughput",
                    "No message loss",
                    "Easy to use",
                ],
                &[
                    "At-least-once delivery (Standard)",
                    "No message ordering (Standard)",
                    "Limited message size (256 KB)",
                ],
                10.0,
                1,
                &["https://docs.aws.amazon.com/sqs/"],
                &["Decoupling microservices", "Batch processing", "Asynchronous workflows"],
            ),
            self.option(
                "Amazon SNS",
                json!({
                    "topic_type": "Standard",
                    "encryption": "enabled"
                }),
                &[
                    "Pub/sub messaging",
                    "Fan-out to multiple subscribers",
                    "Mobile push notifications",
                    "Email/SMS support",
                ],
                &[
                    "No message persistence",
                    "At-least-once delivery",
                    "Limited filtering",
                ],
                5.0,
                2,
                &["https://docs.aws.amazon.com/sns/"],
                &["Event notifications", "Fan-out patterns", "Mobile notifications"],
            ),
        ];

        if tech == Technology::Kafka {
            options.push(self.option(
                "Amazon MSK",
                json!({
                    "kafka_version": "3.5.1",
                    "broker_instance_type": "kafka.m5.large",
                    "brokers_per_az": 1
                }),
                &[
                    "Managed Apache Kafka",
                    "Kafka API compatible",
                    "High throughput",
                    "Exactly-once semantics",
                ],
                &[
                    "Higher cost than SQS/SNS",
                    "More complex to manage",
                    "Requires Kafka expertise",
                ],
                300.0,
                1,
                &["https://docs.aws.amazon.com/msk/"],
                &["Event streaming", "Log aggregation", "Real-time analytics"],
            ));
        }

        options
    }

    fn manual_review_option(&self) -> ServiceOption {
        ServiceOption {
            service_name: "Manual Review Required".to_string(),
            configuration: json!({"note": "Component type requires manual analysis"})
                .as_object()
                .cloned()
                .unwrap_or_default(),
            pros: vec!["Customized solution".to_string()],
            cons: vec!["Requires expert consultation".to_string()],
            estimated_monthly_cost: 0.0,
            rank: 1,
            approved: false,
            documentation_links: Vec::new(),
            use_cases: vec!["Unknown component types".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    fn component(kind: &str, technology: &str) -> Component {
        serde_json::from_value(serde_json::json!({
            "name": "test",
            "type": kind,
            "technology": technology,
            "specifications": {}
        }))
        .unwrap()
    }

    #[test]
    fn classify_precedence() {
        assert_eq!(Technology::classify("Redis 7"), Technology::Cache);
        assert_eq!(Technology::classify("Apache Kafka"), Technology::Kafka);
        assert_eq!(Technology::classify("MySQL 8.0"), Technology::Relational);
        assert_eq!(Technology::classify("SQL Server 2019"), Technology::Relational);
        assert_eq!(Technology::classify("MongoDB"), Technology::NoSql);
        assert_eq!(Technology::classify("custom sql engine"), Technology::GenericSql);
        assert_eq!(Technology::classify("Java with Tomcat"), Technology::Tomcat);
        assert_eq!(Technology::classify("F5 load balancer"), Technology::LoadBalancer);
        assert_eq!(Technology::classify("Kong API gateway"), Technology::ApiGateway);
        assert_eq!(Technology::classify("something else"), Technology::Other);
    }

    #[test]
    fn messaging_with_kafka_includes_managed_kafka() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        let options = rec.recommend(&component("messaging", "kafka"));
        let names: Vec<&str> = options.iter().map(|o| o.service_name.as_str()).collect();
        assert!(names.contains(&"Amazon MSK"));
        assert!(names.contains(&"Amazon SQS"));
        assert!(names.contains(&"Amazon SNS"));
    }

    #[test]
    fn relational_database_gets_rds_and_aurora() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        let options = rec.recommend(&component("database", "postgresql"));
        let names: Vec<&str> = options.iter().map(|o| o.service_name.as_str()).collect();
        assert_eq!(names, vec!["Amazon RDS", "Amazon Aurora"]);
    }

    #[test]
    fn cache_database_prefers_elasticache() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        let options = rec.recommend(&component("database", "redis"));
        let names: Vec<&str> = options.iter().map(|o| o.service_name.as_str()).collect();
        assert!(names.contains(&"Amazon ElastiCache"));
        assert!(names.contains(&"Amazon DynamoDB"));
        assert_eq!(options[0].service_name, "Amazon ElastiCache");
    }

    #[test]
    fn unknown_component_type_requires_manual_review() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        let options = rec.recommend(&component("quantum", "unobtainium"));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].service_name, "Manual Review Required");
        assert!(!options[0].approved);
    }

    #[test]
    fn rank_boost_is_idempotent_and_clamped() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        let options = rec.recommend(&component("compute", "java"));

        // Ranking an already-ranked stable list again yields the same order.
        let once: Vec<String> = options.iter().map(|o| o.service_name.clone()).collect();
        let reranked = rec.rank(options);
        let twice: Vec<String> = reranked.iter().map(|o| o.service_name.clone()).collect();
        assert_eq!(once, twice);
        for option in &reranked {
            assert!(option.rank >= 1);
        }
    }

    #[test]
    fn compare_matrix_covers_exactly_the_inputs() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        let names = vec!["Amazon RDS".to_string(), "Amazon DynamoDB".to_string()];
        let comparison = rec.compare(&names).unwrap();

        let keys: Vec<&String> = comparison.comparison_matrix.keys().collect();
        assert_eq!(keys, vec!["Amazon DynamoDB", "Amazon RDS"]);
        assert!(names.contains(&comparison.recommendation));
        assert!(comparison.reasoning.contains(&comparison.recommendation));
    }

    #[test]
    fn compare_ties_go_to_input_order() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        // Both approved + fully managed → tied at 15; first one wins.
        let comparison = rec
            .compare(&["Amazon SQS".to_string(), "Amazon S3".to_string()])
            .unwrap();
        assert_eq!(comparison.recommendation, "Amazon SQS");
    }

    #[test]
    fn compare_tolerates_unknown_names() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        let comparison = rec
            .compare(&["Amazon RDS".to_string(), "Amazon QLDB".to_string()])
            .unwrap();
        match &comparison.comparison_matrix["Amazon QLDB"] {
            ComparisonEntry::Missing { error } => assert!(error.contains("Amazon QLDB")),
            _ => panic!("expected an error entry"),
        }
        assert_eq!(comparison.recommendation, "Amazon RDS");
    }

    #[test]
    fn compare_requires_two_services() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);
        assert!(rec.compare(&["Amazon RDS".to_string()]).is_err());
    }

    #[test]
    fn details_for_unknown_service_lists_alternatives() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);

        let details = rec.get_details("Amazon S3").unwrap();
        assert_eq!(details.management_level, "Fully Managed");
        assert!(details.approved);

        let err = rec.get_details("Amazon Braket").unwrap_err();
        let available = err.available_services.unwrap();
        assert!(available.contains(&"Amazon S3".to_string()));
    }

    #[test]
    fn docs_query_matches_keywords_and_names() {
        let catalog = catalog();
        let rec = ServiceRecommender::new(&catalog);

        match rec.query_docs("what serverless function options exist?") {
            DocsResult::Matches {
                relevant_services, ..
            } => {
                assert!(relevant_services.iter().any(|m| m.service == "AWS Lambda"));
            }
            DocsResult::NoMatch { .. } => panic!("expected matches"),
        }

        match rec.query_docs("zorbulon hyperdrive") {
            DocsResult::NoMatch { suggestion, .. } => assert!(suggestion.contains("EC2")),
            DocsResult::Matches { .. } => panic!("expected no matches"),
        }
    }
}
