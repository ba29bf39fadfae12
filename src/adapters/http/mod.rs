//! HTTP adapter: Implementation of `Classifier` against the remote service.
//!
//! The request body is the classifier's wire encoding. The response is
//! treated as untrusted JSON: it must be an object carrying a 0/1 class
//! indicator and a numeric probability under one of the configured field
//! names. Anything else becomes a `GatewayFailure`.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::domain::{NormalizedRequest, PredictionClass, PredictionResult};
use crate::ports::{Classifier, GatewayFailure};

/// Field names expected in the classifier response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    /// Candidate probability field names, first present wins
    pub probability_fields: Vec<String>,
    /// Class indicator field name
    pub class_field: String,
}

impl From<&GatewayConfig> for ResponseSchema {
    fn from(cfg: &GatewayConfig) -> Self {
        Self {
            probability_fields: cfg.probability_fields.clone(),
            class_field: cfg.class_field.clone(),
        }
    }
}

impl Default for ResponseSchema {
    fn default() -> Self {
        Self::from(&GatewayConfig::default())
    }
}

fn parse_indicator(value: &Value) -> Option<PredictionClass> {
    match value {
        Value::Bool(b) => Some(PredictionClass::from_indicator(*b)),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 0.0 => Some(PredictionClass::Healthy),
            Some(x) if x == 1.0 => Some(PredictionClass::AtRisk),
            _ => None,
        },
        _ => None,
    }
}

/// Validate a classifier response body.
///
/// - an explicit `"status": false` is a service failure
/// - the class indicator must be `0`, `1`, `true` or `false`
/// - the probability must be a JSON number; it is clamped into [0, 1]
///
/// # Errors
/// Returns the `GatewayFailure` describing the first problem found.
pub fn parse_verdict(body: &Value, schema: &ResponseSchema) -> Result<PredictionResult, GatewayFailure> {
    let obj = body
        .as_object()
        .ok_or_else(|| GatewayFailure::MalformedBody("expected a JSON object".to_string()))?;

    if obj.get("status") == Some(&Value::Bool(false)) {
        let reason = obj
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("status false")
            .to_string();
        return Err(GatewayFailure::ServiceReported(reason));
    }

    let class_value = obj
        .get(&schema.class_field)
        .ok_or_else(|| GatewayFailure::MissingField(schema.class_field.clone()))?;
    let class = parse_indicator(class_value).ok_or_else(|| GatewayFailure::InvalidField {
        field: schema.class_field.clone(),
        reason: format!("expected 0/1, got {class_value}"),
    })?;

    let (field, value) = schema
        .probability_fields
        .iter()
        .find_map(|name| {
            obj.get(name)
                .filter(|v| !v.is_null())
                .map(|v| (name.as_str(), v))
        })
        .ok_or_else(|| GatewayFailure::MissingField(schema.probability_fields.join("|")))?;

    let probability = value
        .as_f64()
        .filter(|p| p.is_finite())
        .ok_or_else(|| GatewayFailure::InvalidField {
            field: field.to_string(),
            reason: format!("expected a number, got {value}"),
        })?;

    if let Some(message) = obj.get("message").and_then(Value::as_str) {
        tracing::debug!("Classifier message: {}", message);
    }

    Ok(PredictionResult::new(class, probability))
}

fn map_transport_error(e: reqwest::Error) -> GatewayFailure {
    if e.is_timeout() {
        GatewayFailure::Timeout
    } else {
        // Strip the URL; it may carry credentials.
        GatewayFailure::Network(e.without_url().to_string())
    }
}

/// Remote classifier reached over HTTP POST + JSON.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    schema: ResponseSchema,
}

impl HttpClassifier {
    /// Build a classifier client from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed (e.g. TLS backend).
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            schema: ResponseSchema::from(config),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, request: &NormalizedRequest) -> Result<PredictionResult, GatewayFailure> {
        let mut builder = self.client.post(&self.endpoint).json(&request.to_wire());
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayFailure::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| GatewayFailure::MalformedBody(e.to_string()))?;

        parse_verdict(&value, &self.schema)
    }

    fn describe(&self) -> String {
        reqwest::Url::parse(&self.endpoint)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "<invalid endpoint>".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{normalize, VitalsInput};
    use proptest::prelude::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn schema() -> ResponseSchema {
        ResponseSchema::default()
    }

    fn request() -> NormalizedRequest {
        normalize(&VitalsInput {
            age: "50".into(),
            sex: "female".into(),
            height: "165".into(),
            weight: "60".into(),
            systolic: "120".into(),
            diastolic: "80".into(),
            cholesterol: "1".into(),
            glucose: "1".into(),
            smoker: false,
            alcohol: false,
            active: true,
        })
        .expect("Should normalize")
    }

    #[test]
    fn test_parse_backend_response() {
        let body = json!({
            "status": true,
            "prediction": 1,
            "risk_probability": 0.734,
            "message": "High Risk"
        });
        let result = parse_verdict(&body, &schema()).expect("Should parse");
        assert_eq!(result.predicted_class(), PredictionClass::AtRisk);
        assert!((result.probability() - 0.734).abs() < f64::EPSILON);
    }

    #[test]
    fn test_alternate_probability_field() {
        let body = json!({ "prediction": 0, "probability": 0.2 });
        let result = parse_verdict(&body, &schema()).expect("Should parse");
        assert_eq!(result.predicted_class(), PredictionClass::Healthy);
        assert!((result.probability() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_configured_field_names() {
        let schema = ResponseSchema {
            probability_fields: vec!["p".to_string()],
            class_field: "label".to_string(),
        };
        let body = json!({ "label": true, "p": 0.9, "probability": 0.1 });
        let result = parse_verdict(&body, &schema).expect("Should parse");
        assert_eq!(result.predicted_class(), PredictionClass::AtRisk);
        assert!((result.probability() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_probability_clamped() {
        let high = parse_verdict(&json!({ "prediction": 1, "probability": 1.4 }), &schema())
            .expect("Should parse");
        assert_eq!(high.probability(), 1.0);

        let low = parse_verdict(&json!({ "prediction": 0, "probability": -2 }), &schema())
            .expect("Should parse");
        assert_eq!(low.probability(), 0.0);
    }

    #[test]
    fn test_status_false_is_failure() {
        let body = json!({ "status": false, "error": "scaler missing" });
        assert_eq!(
            parse_verdict(&body, &schema()),
            Err(GatewayFailure::ServiceReported("scaler missing".to_string()))
        );
    }

    #[test]
    fn test_missing_and_invalid_fields() {
        assert!(matches!(
            parse_verdict(&json!({ "probability": 0.5 }), &schema()),
            Err(GatewayFailure::MissingField(_))
        ));
        assert!(matches!(
            parse_verdict(&json!({ "prediction": 1 }), &schema()),
            Err(GatewayFailure::MissingField(_))
        ));
        assert!(matches!(
            parse_verdict(&json!({ "prediction": 1, "probability": null }), &schema()),
            Err(GatewayFailure::MissingField(_))
        ));
        assert!(matches!(
            parse_verdict(&json!({ "prediction": 1, "probability": "0.7" }), &schema()),
            Err(GatewayFailure::InvalidField { .. })
        ));
        assert!(matches!(
            parse_verdict(&json!({ "prediction": 2, "probability": 0.7 }), &schema()),
            Err(GatewayFailure::InvalidField { .. })
        ));
        assert!(matches!(
            parse_verdict(&json!([1, 0.5]), &schema()),
            Err(GatewayFailure::MalformedBody(_))
        ));
    }

    fn arbitrary_probability() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<f64>().prop_map(|x| json!(x)),
            (-10.0f64..10.0).prop_map(|x| json!(x)),
            any::<i64>().prop_map(|x| json!(x)),
            ".*".prop_map(Value::String),
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
        ]
    }

    proptest! {
        #[test]
        fn prop_probability_always_in_unit_range(
            probability in proptest::option::of(arbitrary_probability()),
            class in prop_oneof![Just(json!(0)), Just(json!(1)), Just(json!(true)), Just(json!("x"))],
        ) {
            let mut body = json!({ "prediction": class });
            if let Some(p) = probability {
                body["risk_probability"] = p;
            }
            if let Ok(result) = parse_verdict(&body, &schema()) {
                let p = result.probability();
                prop_assert!(!p.is_nan());
                prop_assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    /// Serve a single canned HTTP response on a random local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Should bind");
        let addr = listener.local_addr().expect("Should have addr");

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("Should accept");
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.expect("Should read");
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .and_then(|v| v.trim().parse::<usize>().ok())
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("Should write");
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/predict")
    }

    fn classifier_for(endpoint: String) -> HttpClassifier {
        let config = GatewayConfig {
            endpoint,
            timeout_ms: 2_000,
            ..GatewayConfig::default()
        };
        HttpClassifier::new(&config).expect("Should build client")
    }

    #[tokio::test]
    async fn test_http_success() {
        let endpoint = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"status": true, "prediction": 0, "risk_probability": 0.31, "message": "Low Risk"}"#,
        )
        .await;

        let result = classifier_for(endpoint)
            .classify(&request())
            .await
            .expect("Should classify");
        assert_eq!(result.predicted_class(), PredictionClass::Healthy);
        assert!((result.probability() - 0.31).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let endpoint = serve_once("HTTP/1.1 503 Service Unavailable", "{}").await;
        let err = classifier_for(endpoint)
            .classify(&request())
            .await
            .expect_err("Should fail");
        assert_eq!(err, GatewayFailure::Status(503));
    }

    #[tokio::test]
    async fn test_http_malformed_body() {
        let endpoint = serve_once("HTTP/1.1 200 OK", "<html>oops</html>").await;
        let err = classifier_for(endpoint)
            .classify(&request())
            .await
            .expect_err("Should fail");
        assert!(matches!(err, GatewayFailure::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_http_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Should bind");
        let addr = listener.local_addr().expect("Should have addr");
        drop(listener);

        let err = classifier_for(format!("http://{addr}/predict"))
            .classify(&request())
            .await
            .expect_err("Should fail");
        assert!(matches!(err, GatewayFailure::Network(_)));
    }

    #[test]
    fn test_describe_reports_host_only() {
        let config = GatewayConfig {
            endpoint: "https://user:pw@cardio.example.org/predict".to_string(),
            ..GatewayConfig::default()
        };
        let classifier = HttpClassifier::new(&config).expect("Should build client");
        assert_eq!(classifier.describe(), "cardio.example.org");
    }
}
