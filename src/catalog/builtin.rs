//! Static pricing and knowledge tables (us-east-1 list prices). A remote
//! overlay can replace any entry without touching this file.

use std::collections::BTreeMap;

use super::{BillingModel, ServiceInfo, ServicePricing};

fn table(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn entry(
    model: BillingModel,
    pricing_model: &str,
    hourly: (&[(&str, f64)], f64),
    storage: (&[(&str, f64)], f64),
    rates: &[(&str, f64)],
) -> ServicePricing {
    ServicePricing {
        model,
        pricing_model: pricing_model.to_string(),
        hourly_rates: table(hourly.0),
        default_hourly_rate: hourly.1,
        storage_rates: table(storage.0),
        default_storage_rate: storage.1,
        rates: table(rates),
    }
}

pub(super) fn pricing() -> BTreeMap<String, ServicePricing> {
    let mut map = BTreeMap::new();

    map.insert(
        "Amazon EC2".to_string(),
        entry(
            BillingModel::InstanceHours,
            "Per hour",
            (
                &[
                    ("t3.micro", 0.0104),
                    ("t3.small", 0.0208),
                    ("t3.medium", 0.0416),
                    ("t3.large", 0.0832),
                    ("t3.xlarge", 0.1664),
                    ("t3.2xlarge", 0.3328),
                    ("m5.large", 0.096),
                    ("m5.xlarge", 0.192),
                    ("m5.2xlarge", 0.384),
                    ("c5.large", 0.085),
                    ("c5.xlarge", 0.17),
                    ("r5.large", 0.126),
                    ("r5.xlarge", 0.252),
                ],
                0.05,
            ),
            (&[], 0.0),
            &[],
        ),
    );

    map.insert(
        "Amazon RDS".to_string(),
        entry(
            BillingModel::DatabaseInstance,
            "Per hour + storage",
            (
                &[
                    ("db.t3.micro", 0.017),
                    ("db.t3.small", 0.034),
                    ("db.t3.medium", 0.068),
                    ("db.t3.large", 0.136),
                    ("db.r5.large", 0.24),
                    ("db.r5.xlarge", 0.48),
                    ("db.m5.large", 0.192),
                    ("db.m5.xlarge", 0.384),
                ],
                0.068,
            ),
            (&[], 0.0),
            &[("storage_per_gb", 0.115)],
        ),
    );

    map.insert(
        "Amazon Aurora".to_string(),
        entry(
            BillingModel::ClusterInstance,
            "Per hour + storage + I/O",
            (
                &[
                    ("db.r5.large", 0.29),
                    ("db.r5.xlarge", 0.58),
                    ("db.r5.2xlarge", 1.16),
                    ("db.r6g.large", 0.26),
                    ("db.r6g.xlarge", 0.52),
                ],
                0.29,
            ),
            (&[], 0.0),
            &[("storage_per_gb", 0.10), ("io_per_million", 0.20)],
        ),
    );

    map.insert(
        "Amazon DynamoDB".to_string(),
        entry(
            BillingModel::ReadWriteUnits,
            "On-Demand or Provisioned",
            (&[], 0.0),
            (&[], 0.0),
            &[
                ("on_demand_read_per_million", 0.25),
                ("on_demand_write_per_million", 1.25),
                ("provisioned_read_per_hour", 0.00013),
                ("provisioned_write_per_hour", 0.00065),
                ("storage_per_gb", 0.25),
            ],
        ),
    );

    map.insert(
        "Amazon S3".to_string(),
        entry(
            BillingModel::ObjectStorage,
            "Per GB + requests",
            (&[], 0.0),
            (
                &[
                    ("S3 Standard", 0.023),
                    ("S3 Intelligent-Tiering", 0.023),
                    ("S3 Standard-IA", 0.0125),
                    ("S3 One Zone-IA", 0.01),
                    ("S3 Glacier Instant Retrieval", 0.004),
                    ("S3 Glacier Flexible Retrieval", 0.0036),
                    ("S3 Glacier Deep Archive", 0.00099),
                ],
                0.023,
            ),
            &[("request_per_1000", 0.0004)],
        ),
    );

    map.insert(
        "Amazon EBS".to_string(),
        entry(
            BillingModel::BlockStorage,
            "Per GB-month",
            (&[], 0.0),
            (
                &[
                    ("gp2", 0.10),
                    ("gp3", 0.08),
                    ("io1", 0.125),
                    ("io2", 0.125),
                    ("st1", 0.045),
                    ("sc1", 0.015),
                ],
                0.08,
            ),
            &[],
        ),
    );

    map.insert(
        "Amazon EFS".to_string(),
        entry(
            BillingModel::FileStorage,
            "Per GB-month",
            (&[], 0.0),
            (&[("Standard", 0.30), ("Infrequent Access", 0.025)], 0.30),
            &[("unit", 0.30)],
        ),
    );

    map.insert(
        "AWS Lambda".to_string(),
        entry(
            BillingModel::Serverless,
            "Per request + compute",
            (&[], 0.0),
            (&[], 0.0),
            &[
                ("request_per_million", 0.20),
                ("compute_per_million_gb_seconds", 16.67),
            ],
        ),
    );

    map.insert(
        "AWS Elastic Beanstalk".to_string(),
        entry(
            BillingModel::Flat,
            "No additional charge (pay for underlying resources)",
            (&[], 0.0),
            (&[], 0.0),
            &[],
        ),
    );

    map.insert(
        "Application Load Balancer".to_string(),
        entry(
            BillingModel::LoadBalancer,
            "Per hour + LCU",
            (&[], 0.0),
            (&[], 0.0),
            &[("hourly", 0.0225), ("lcu_hour", 0.008)],
        ),
    );

    map.insert(
        "Network Load Balancer".to_string(),
        entry(
            BillingModel::LoadBalancer,
            "Per hour + LCU",
            (&[], 0.0),
            (&[], 0.0),
            &[("hourly", 0.0225), ("lcu_hour", 0.006)],
        ),
    );

    map.insert(
        "Amazon ElastiCache".to_string(),
        entry(
            BillingModel::CacheNodes,
            "Per hour",
            (
                &[
                    ("cache.t3.micro", 0.017),
                    ("cache.t3.small", 0.034),
                    ("cache.t3.medium", 0.068),
                    ("cache.r5.large", 0.188),
                    ("cache.r5.xlarge", 0.376),
                    ("cache.m5.large", 0.161),
                    ("cache.m5.xlarge", 0.322),
                ],
                0.068,
            ),
            (&[], 0.0),
            &[],
        ),
    );

    map.insert(
        "Amazon SQS".to_string(),
        entry(
            BillingModel::MeteredRequests,
            "Per million requests",
            (&[], 0.0),
            (&[], 0.0),
            &[("per_million", 0.40), ("free_tier", 1_000_000.0)],
        ),
    );

    map.insert(
        "Amazon SNS".to_string(),
        entry(
            BillingModel::MeteredRequests,
            "Per million requests",
            (&[], 0.0),
            (&[], 0.0),
            &[("per_million", 0.50), ("free_tier", 1_000_000.0)],
        ),
    );

    map.insert(
        "Amazon MSK".to_string(),
        entry(
            BillingModel::BrokerStorage,
            "Per broker hour + storage",
            (
                &[
                    ("kafka.t3.small", 0.038),
                    ("kafka.m5.large", 0.21),
                    ("kafka.m5.xlarge", 0.42),
                    ("kafka.m5.2xlarge", 0.84),
                ],
                0.21,
            ),
            (&[], 0.0),
            &[("storage_per_gb", 0.10)],
        ),
    );

    map.insert(
        "Amazon API Gateway".to_string(),
        entry(
            BillingModel::TieredRequests,
            "Per million requests",
            (&[], 0.0),
            (&[], 0.0),
            &[
                ("first_tier_per_million", 3.50),
                ("next_tier_per_million", 3.00),
            ],
        ),
    );

    map
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

struct InfoSpec {
    description: &'static str,
    pricing_model: &'static str,
    management_level: &'static str,
    scalability: &'static str,
    features: &'static [&'static str],
    use_cases: &'static [&'static str],
    pros: &'static [&'static str],
    cons: &'static [&'static str],
    documentation_link: &'static str,
    keywords: &'static [&'static str],
}

impl InfoSpec {
    fn build(&self) -> ServiceInfo {
        ServiceInfo {
            description: self.description.to_string(),
            pricing_model: self.pricing_model.to_string(),
            management_level: self.management_level.to_string(),
            scalability: self.scalability.to_string(),
            features: strings(self.features),
            use_cases: strings(self.use_cases),
            pros: strings(self.pros),
            cons: strings(self.cons),
            documentation_link: self.documentation_link.to_string(),
            keywords: strings(self.keywords),
        }
    }
}

pub(super) fn knowledge() -> BTreeMap<String, ServiceInfo> {
    let entries: &[(&str, InfoSpec)] = &[
        (
            "Amazon EC2",
            InfoSpec {
                description: "Virtual servers in the cloud",
                pricing_model: "Per hour/second",
                management_level: "Self-managed",
                scalability: "Manual or Auto Scaling",
                features: &[
                    "Multiple instance types",
                    "Flexible configurations",
                    "Spot instances",
                ],
                use_cases: &["General compute", "Legacy applications", "Custom workloads"],
                pros: &["Full control", "Wide range of options", "Flexible pricing"],
                cons: &["Requires management", "Operational overhead"],
                documentation_link: "https://docs.aws.amazon.com/ec2/",
                keywords: &["compute", "virtual machine", "instance", "server"],
            },
        ),
        (
            "AWS Lambda",
            InfoSpec {
                description: "Run code without provisioning servers",
                pricing_model: "Per request and duration",
                management_level: "Fully Managed",
                scalability: "Automatic",
                features: &["Event-driven", "Auto-scaling", "Pay per use"],
                use_cases: &["Serverless applications", "Event processing", "APIs"],
                pros: &[
                    "No infrastructure management",
                    "Cost-efficient",
                    "Auto-scaling",
                ],
                cons: &["Cold starts", "Execution limits", "Stateless"],
                documentation_link: "https://docs.aws.amazon.com/lambda/",
                keywords: &["serverless", "function", "event-driven", "faas"],
            },
        ),
        (
            "Amazon RDS",
            InfoSpec {
                description: "Managed relational database service",
                pricing_model: "Per hour + storage",
                management_level: "Fully Managed",
                scalability: "Vertical scaling + Read replicas",
                features: &["Automated backups", "Multi-AZ", "Read replicas"],
                use_cases: &["Relational databases", "OLTP", "Traditional apps"],
                pros: &["Managed service", "High availability", "Automated maintenance"],
                cons: &["Less control", "Cost", "Some feature limitations"],
                documentation_link: "https://docs.aws.amazon.com/rds/",
                keywords: &["database", "relational", "sql", "mysql", "postgresql"],
            },
        ),
        (
            "Amazon DynamoDB",
            InfoSpec {
                description: "Fast and flexible NoSQL database",
                pricing_model: "Per request or provisioned capacity",
                management_level: "Fully Managed",
                scalability: "Automatic",
                features: &[
                    "Single-digit ms latency",
                    "Auto-scaling",
                    "Global tables",
                ],
                use_cases: &["NoSQL workloads", "High-scale apps", "Real-time"],
                pros: &["High performance", "Serverless option", "Auto-scaling"],
                cons: &["Different data model", "Query limitations", "Learning curve"],
                documentation_link: "https://docs.aws.amazon.com/dynamodb/",
                keywords: &["nosql", "database", "key-value", "document"],
            },
        ),
        (
            "Amazon S3",
            InfoSpec {
                description: "Object storage service",
                pricing_model: "Per GB stored + requests",
                management_level: "Fully Managed",
                scalability: "Unlimited",
                features: &["11 9s durability", "Versioning", "Lifecycle policies"],
                use_cases: &[
                    "Object storage",
                    "Backups",
                    "Data lakes",
                    "Static hosting",
                ],
                pros: &["Highly durable", "Scalable", "Cost-effective"],
                cons: &["Object storage model", "Eventual consistency"],
                documentation_link: "https://docs.aws.amazon.com/s3/",
                keywords: &["storage", "object", "bucket", "file"],
            },
        ),
        (
            "Application Load Balancer",
            InfoSpec {
                description: "Layer 7 load balancing",
                pricing_model: "Per hour + LCU",
                management_level: "Fully Managed",
                scalability: "Automatic",
                features: &["Content-based routing", "WebSocket", "HTTP/2"],
                use_cases: &["Web applications", "Microservices", "Containers"],
                pros: &["Advanced routing", "Integrated with AWS", "Auto-scaling"],
                cons: &["Cost", "Latency", "HTTP/HTTPS only"],
                documentation_link: "https://docs.aws.amazon.com/elasticloadbalancing/",
                keywords: &["load balancer", "alb", "layer 7", "http"],
            },
        ),
        (
            "Amazon SQS",
            InfoSpec {
                description: "Fully managed message queuing service",
                pricing_model: "Per request",
                management_level: "Fully Managed",
                scalability: "Unlimited",
                features: &[
                    "At-least-once delivery",
                    "Dead letter queues",
                    "Long polling",
                ],
                use_cases: &["Decoupling", "Async processing", "Microservices"],
                pros: &["Simple", "Scalable", "Reliable"],
                cons: &["No ordering (Standard)", "Message size limits"],
                documentation_link: "https://docs.aws.amazon.com/sqs/",
                keywords: &["queue", "message", "messaging", "async"],
            },
        ),
    ];

    entries
        .iter()
        .map(|(name, spec)| (name.to_string(), spec.build()))
        .collect()
}

pub(super) fn approved() -> Vec<String> {
    strings(&[
        "Amazon EC2",
        "AWS Lambda",
        "AWS Elastic Beanstalk",
        "Amazon RDS",
        "Amazon Aurora",
        "Amazon DynamoDB",
        "Amazon S3",
        "Amazon EFS",
        "Amazon EBS",
        "Application Load Balancer",
        "Network Load Balancer",
        "Amazon API Gateway",
        "Amazon SQS",
        "Amazon SNS",
        "Amazon MSK",
        "Amazon ElastiCache",
    ])
}
