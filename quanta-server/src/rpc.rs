//! JSON-RPC 2.0 dispatch over the engine

use std::path::PathBuf;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};
use quanta::{codes, Catalog, Quanta, QuantaError, RawInputs, Value};

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<JsonValue>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    fn new(id: Option<JsonValue>, outcome: Result<JsonValue, RpcError>) -> Self {
        match outcome {
            Ok(result) => RpcResponse { jsonrpc: "2.0", id, result: Some(result), error: None },
            Err(error) => RpcResponse { jsonrpc: "2.0", id, result: None, error: Some(error) },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl RpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        RpcError { code, message: message.into(), data: None }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }
}

/// Engine errors travel in `data` so clients see code and suggestion
impl From<QuantaError> for RpcError {
    fn from(error: QuantaError) -> Self {
        let code = if error.is(codes::INTERNAL) { INTERNAL_ERROR } else { INVALID_PARAMS };
        RpcError {
            code,
            message: error.message.clone(),
            data: serde_json::to_value(&error).ok(),
        }
    }
}

// ============ Params ============

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DescribeParams {
    calculator: String,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteParams {
    calculator: String,
    #[serde(flatten)]
    inputs: RawInputs,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PresetParams {
    calculator: String,
    preset: String,
    locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UnitsParams {
    dimension: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConvertParams {
    value: Value,
    from: Option<String>,
    to: String,
    dimension: String,
}

/// Reload takes no arguments; the directory is server configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReloadParams {}

/// Missing params read as `{}`
fn params<T: DeserializeOwned>(params: &Option<JsonValue>) -> Result<T, RpcError> {
    let value = params.clone().unwrap_or_else(|| json!({}));
    serde_json::from_value(value).map_err(|e| RpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<JsonValue, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::new(INTERNAL_ERROR, e.to_string()))
}

// ============ Server ============

pub struct Server {
    quanta: Quanta,
    locale_dir: Option<PathBuf>,
}

impl Server {
    pub fn new(quanta: Quanta, locale_dir: Option<PathBuf>) -> Self {
        Server { quanta, locale_dir }
    }

    /// One protocol line in, at most one line out. Notifications and blank
    /// lines produce nothing.
    pub fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<RpcRequest>(line) {
            Ok(request) => {
                debug!(method = %request.method, "request");
                let response = self.handle(&request);
                if request.id.is_none() {
                    debug!(method = %request.method, "notification processed");
                    return None;
                }
                response
            }
            Err(e) => {
                warn!(error = %e, "unparsable request");
                RpcResponse::new(None, Err(RpcError::new(PARSE_ERROR, format!("Parse error: {}", e))))
            }
        };

        match serde_json::to_string(&response) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "response could not be serialized");
                None
            }
        }
    }

    pub fn handle(&self, request: &RpcRequest) -> RpcResponse {
        let outcome = match request.method.as_str() {
            "ping" => Ok(json!({})),
            "calculators/list" => self.list(&request.params),
            "calculators/describe" => self.describe(&request.params),
            "calculators/execute" => self.execute(&request.params),
            "calculators/preset" => self.preset(&request.params),
            "units/list" => self.units(&request.params),
            "units/convert" => self.convert(&request.params),
            "locales/reload" => self.reload(&request.params),
            _ => Err(RpcError::new(METHOD_NOT_FOUND, format!("Method not found: {}", request.method))),
        };
        RpcResponse::new(request.id.clone(), outcome)
    }

    fn list(&self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: ListParams = params(raw)?;
        to_json(&self.quanta.list(p.category.as_deref()))
    }

    fn describe(&self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: DescribeParams = params(raw)?;
        to_json(&self.quanta.describe(&p.calculator, p.locale.as_deref())?)
    }

    fn execute(&self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: ExecuteParams = params(raw)?;
        to_json(&self.quanta.execute(&p.calculator, &p.inputs, p.locale.as_deref())?)
    }

    fn preset(&self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: PresetParams = params(raw)?;
        to_json(&self.quanta.apply_preset(&p.calculator, &p.preset, p.locale.as_deref())?)
    }

    fn units(&self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: UnitsParams = params(raw)?;
        to_json(&self.quanta.list_units(p.dimension.as_deref(), p.locale.as_deref())?)
    }

    fn convert(&self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let p: ConvertParams = params(raw)?;
        let value = self.quanta.convert(&p.value, p.from.as_deref(), &p.to, &p.dimension)?;
        Ok(json!({ "value": to_json(&value)?, "unit": p.to }))
    }

    /// Reload from the configured directory, else the builtin tables
    fn reload(&self, raw: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
        let _: ReloadParams = params(raw)?;
        let codes = match &self.locale_dir {
            Some(dir) => self.quanta.reload_locales_from(dir)?,
            None => self.quanta.reload_locales(Catalog::builtin()),
        };
        Ok(json!({ "locales": codes }))
    }
}
