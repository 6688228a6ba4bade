//! Function-call dispatch layer. Requests name an operation and carry a flat
//! parameter list; responses are JSON-serialized into a fixed envelope
//! whether the operation succeeded or returned a structured error. Nothing
//! here panics on caller input — malformed parameters become `{error}`
//! bodies inside a well-formed envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::estimator::{Architecture, CostEstimator};
use crate::recommend::{Component, ServiceRecommender};
use crate::types::{ser_money, Configuration, CostOptimization, OpError, ServiceCost};

#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct Envelope {
    #[serde(rename = "messageVersion")]
    pub message_version: String,
    pub response: EnvelopeResponse,
}

#[derive(Debug, Serialize)]
pub struct EnvelopeResponse {
    #[serde(rename = "functionResponse")]
    pub function_response: FunctionResponse,
}

#[derive(Debug, Serialize)]
pub struct FunctionResponse {
    #[serde(rename = "responseBody")]
    pub response_body: ResponseBody,
}

#[derive(Debug, Serialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Serialize)]
pub struct TextBody {
    pub body: String,
}

impl Envelope {
    pub fn wrap(result: &Value) -> Self {
        let body = serde_json::to_string(result)
            .unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"));
        Self {
            message_version: "1.0".to_string(),
            response: EnvelopeResponse {
                function_response: FunctionResponse {
                    response_body: ResponseBody {
                        text: TextBody { body },
                    },
                },
            },
        }
    }
}

/// Wire shape for `identify_cost_optimizations`.
#[derive(Debug, Serialize)]
struct OptimizationReport {
    optimizations: Vec<CostOptimization>,
    count: usize,
    #[serde(serialize_with = "ser_money")]
    total_potential_savings: f64,
}

/// Wire shape for `recommend_services`.
#[derive(Debug, Serialize)]
struct RecommendationReport {
    component_name: String,
    recommendations: Vec<crate::types::ServiceOption>,
    count: usize,
}

pub fn handle(
    request: &InvokeRequest,
    catalog: &Catalog,
    default_region: Option<&str>,
    discount_rate: Option<f64>,
) -> Envelope {
    Envelope::wrap(&dispatch(request, catalog, default_region, discount_rate))
}

/// Route one request to its operation and return the raw result body.
pub fn dispatch(
    request: &InvokeRequest,
    catalog: &Catalog,
    default_region: Option<&str>,
    discount_rate: Option<f64>,
) -> Value {
    let params = params_map(&request.parameters);

    // A per-call region parameter re-targets the estimator.
    let region = params
        .get("region")
        .and_then(Value::as_str)
        .or(default_region);
    let estimator = CostEstimator::new(catalog, region, discount_rate);
    let recommender = ServiceRecommender::new(catalog);

    let result = match request.function.as_str() {
        "estimate_service_cost" => estimate_service_cost(&params, &estimator),
        "calculate_total_cost" => calculate_total_cost(&params, &estimator),
        "apply_discounts" => apply_discounts(&params, &estimator),
        "identify_cost_optimizations" => identify_cost_optimizations(&params, &estimator),
        "compare_costs" => compare_costs(&params, &estimator),
        "recommend_services" => recommend_services(&params, &recommender),
        "query_aws_docs" => query_aws_docs(&params, &recommender),
        "compare_services" => compare_services(&params, &recommender),
        "get_service_details" => get_service_details(&params, &recommender),
        other => Err(OpError::new(format!("Unknown function: {other}"))),
    };

    match result {
        Ok(body) => body,
        Err(e) => to_value(&e),
    }
}

fn params_map(parameters: &[Parameter]) -> Configuration {
    parameters
        .iter()
        .map(|p| (p.name.clone(), p.value.clone()))
        .collect()
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

// Parameter coercion. Values arrive as whatever the caller sent — objects,
// arrays, numbers, or strings holding JSON / numbers — and are decoded
// tolerantly before dispatch.

fn str_param<'p>(params: &'p Configuration, key: &str) -> Result<&'p str, OpError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OpError::new(format!("Missing required parameter: {key}")))
}

fn json_param(params: &Configuration, key: &str) -> Result<Value, OpError> {
    match params.get(key) {
        None | Some(Value::Null) => {
            Err(OpError::new(format!("Missing required parameter: {key}")))
        }
        Some(Value::String(s)) => serde_json::from_str(s)
            .map_err(|_| OpError::new(format!("Invalid {key} JSON format"))),
        Some(other) => Ok(other.clone()),
    }
}

fn number_param(params: &Configuration, key: &str) -> Result<f64, OpError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| OpError::new(format!("Invalid {key} format, must be a number"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| OpError::new(format!("Invalid {key} format, must be a number"))),
        Some(_) => Err(OpError::new(format!(
            "Invalid {key} format, must be a number"
        ))),
    }
}

fn estimate_service_cost(
    params: &Configuration,
    estimator: &CostEstimator,
) -> Result<Value, OpError> {
    let service = str_param(params, "service")?;
    let configuration = match params.get("configuration") {
        None | Some(Value::Null) => Configuration::new(),
        _ => json_param(params, "configuration")?
            .as_object()
            .cloned()
            .ok_or_else(|| OpError::new("Invalid configuration JSON format"))?,
    };

    estimator
        .estimate_service_cost(service, &configuration)
        .map(|cost| to_value(&cost))
}

fn calculate_total_cost(
    params: &Configuration,
    estimator: &CostEstimator,
) -> Result<Value, OpError> {
    let raw = json_param(params, "architecture")?;
    let architecture: Architecture = serde_json::from_value(raw)
        .map_err(|_| OpError::new("Invalid architecture JSON format"))?;

    estimator
        .calculate_total_cost(&architecture)
        .map(|estimate| to_value(&estimate))
}

fn apply_discounts(params: &Configuration, estimator: &CostEstimator) -> Result<Value, OpError> {
    let base_cost = number_param(params, "base_cost")?;
    estimator.apply_discount(base_cost).map(|s| to_value(&s))
}

fn identify_cost_optimizations(
    params: &Configuration,
    estimator: &CostEstimator,
) -> Result<Value, OpError> {
    let raw = json_param(params, "breakdown")
        .map_err(|_| OpError::new("Missing required parameter: breakdown"))?;
    let breakdown: Vec<ServiceCost> = serde_json::from_value(raw)
        .map_err(|e| OpError::new(format!("Invalid ServiceCost format: {e}")))?;
    if breakdown.is_empty() {
        return Err(OpError::new("Missing required parameter: breakdown"));
    }

    let optimizations = estimator.identify_optimizations(&breakdown);
    let total: f64 = optimizations.iter().map(|o| o.potential_savings).sum();

    Ok(to_value(&OptimizationReport {
        count: optimizations.len(),
        total_potential_savings: total,
        optimizations,
    }))
}

fn compare_costs(params: &Configuration, estimator: &CostEstimator) -> Result<Value, OpError> {
    let onprem = number_param(params, "onprem_cost")?;
    let aws = number_param(params, "aws_cost")?;
    estimator.compare_costs(onprem, aws).map(|c| to_value(&c))
}

fn recommend_services(
    params: &Configuration,
    recommender: &ServiceRecommender,
) -> Result<Value, OpError> {
    let raw = json_param(params, "component")?;
    let component: Component = serde_json::from_value(raw)
        .map_err(|_| OpError::new("Invalid component JSON format"))?;

    let recommendations = recommender.recommend(&component);
    Ok(to_value(&RecommendationReport {
        component_name: component.name.clone(),
        count: recommendations.len(),
        recommendations,
    }))
}

fn query_aws_docs(
    params: &Configuration,
    recommender: &ServiceRecommender,
) -> Result<Value, OpError> {
    let query = str_param(params, "query")?;
    Ok(to_value(&recommender.query_docs(query)))
}

fn compare_services(
    params: &Configuration,
    recommender: &ServiceRecommender,
) -> Result<Value, OpError> {
    let raw = json_param(params, "services")?;
    let names: Vec<String> = match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => return Err(OpError::new("Invalid services JSON format")),
    };

    recommender.compare(&names).map(|c| to_value(&c))
}

fn get_service_details(
    params: &Configuration,
    recommender: &ServiceRecommender,
) -> Result<Value, OpError> {
    let service_name = str_param(params, "service_name")?;
    recommender.get_details(service_name).map(|d| to_value(&d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(function: &str, params: Value) -> InvokeRequest {
        serde_json::from_value(json!({
            "function": function,
            "parameters": params
        }))
        .unwrap()
    }

    fn body_of(envelope: &Envelope) -> Value {
        serde_json::from_str(&envelope.response.function_response.response_body.text.body)
            .unwrap()
    }

    #[test]
    fn envelope_has_fixed_shape() {
        let catalog = Catalog::builtin();
        let req = request("get_service_details", json!([{"name": "service_name", "value": "Amazon S3"}]));
        let envelope = handle(&req, &catalog, None, None);

        let v = serde_json::to_value(&envelope).unwrap();
        assert_eq!(v["messageVersion"], "1.0");
        let body = &v["response"]["functionResponse"]["responseBody"]["TEXT"]["body"];
        assert!(body.is_string());
        let inner: Value = serde_json::from_str(body.as_str().unwrap()).unwrap();
        assert_eq!(inner["service_name"], "Amazon S3");
    }

    #[test]
    fn configuration_accepts_json_strings() {
        let catalog = Catalog::builtin();
        let req = request(
            "estimate_service_cost",
            json!([
                {"name": "service", "value": "Amazon EC2"},
                {"name": "configuration", "value": "{\"instance_type\": \"t3.medium\", \"instances\": 2}"}
            ]),
        );
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["monthly_cost"], json!(60.74));

        let bad = request(
            "estimate_service_cost",
            json!([
                {"name": "service", "value": "Amazon EC2"},
                {"name": "configuration", "value": "{not json"}
            ]),
        );
        let body = body_of(&handle(&bad, &catalog, None, None));
        assert_eq!(body["error"], "Invalid configuration JSON format");
    }

    #[test]
    fn missing_service_parameter() {
        let catalog = Catalog::builtin();
        let req = request("estimate_service_cost", json!([]));
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["error"], "Missing required parameter: service");
    }

    #[test]
    fn unknown_function_is_an_error_body() {
        let catalog = Catalog::builtin();
        let req = request("summon_dragons", json!([]));
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["error"], "Unknown function: summon_dragons");
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let catalog = Catalog::builtin();
        let req = request(
            "apply_discounts",
            json!([{"name": "base_cost", "value": "1000"}]),
        );
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["final_cost"], json!(900.0));

        let req = request(
            "apply_discounts",
            json!([{"name": "base_cost", "value": "lots"}]),
        );
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["error"], "Invalid base_cost format, must be a number");
    }

    #[test]
    fn missing_base_cost_defaults_to_zero_and_is_rejected() {
        let catalog = Catalog::builtin();
        let req = request("apply_discounts", json!([]));
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["error"], "base_cost must be greater than 0");
    }

    #[test]
    fn total_cost_round_trip() {
        let catalog = Catalog::builtin();
        let architecture = json!({
            "services": [
                {"service_name": "Amazon S3", "configuration": {
                    "storage_gb": 100, "storage_class": "S3 Standard", "requests_per_month": 10000
                }}
            ]
        });
        let req = request(
            "calculate_total_cost",
            json!([{"name": "architecture", "value": architecture.to_string()}]),
        );
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["total_monthly_cost"], json!(2.07));
        assert_eq!(body["discount_applied"], json!(0.23));
    }

    #[test]
    fn optimizations_report_totals() {
        let catalog = Catalog::builtin();
        let breakdown = json!([{
            "service_name": "Amazon EC2",
            "configuration": {"pricing_model": "On-Demand", "instance_type": "m5.xlarge"},
            "monthly_cost": 100.0,
            "unit_cost": 0.0,
            "units": 1,
            "pricing_model": "Per hour",
            "region": "us-east-1"
        }]);
        let req = request(
            "identify_cost_optimizations",
            json!([{"name": "breakdown", "value": breakdown.to_string()}]),
        );
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["count"], 2);
        assert_eq!(body["total_potential_savings"], json!(65.0));
    }

    #[test]
    fn recommend_services_wraps_component_name() {
        let catalog = Catalog::builtin();
        let req = request(
            "recommend_services",
            json!([{"name": "component", "value": {
                "name": "event bus", "type": "messaging", "technology": "kafka"
            }}]),
        );
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["component_name"], "event bus");
        let names: Vec<&str> = body["recommendations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["service_name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Amazon MSK"));
    }

    #[test]
    fn region_parameter_retargets_the_estimator() {
        let catalog = Catalog::builtin();
        let req = request(
            "estimate_service_cost",
            json!([
                {"name": "service", "value": "Amazon S3"},
                {"name": "region", "value": "ap-southeast-2"}
            ]),
        );
        let body = body_of(&handle(&req, &catalog, None, None));
        assert_eq!(body["region"], "ap-southeast-2");
    }

    #[test]
    fn compare_services_accepts_array_strings() {
        let catalog = Catalog::builtin();
        let req = request(
            "compare_services",
            json!([{"name": "services", "value": "[\"Amazon RDS\", \"Amazon DynamoDB\"]"}]),
        );
        let body = body_of(&handle(&req, &catalog, None, None));
        let matrix = body["comparison_matrix"].as_object().unwrap();
        assert_eq!(matrix.len(), 2);
        assert!(body["recommendation"].is_string());
    }
}
