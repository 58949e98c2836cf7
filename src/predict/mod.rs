//! Client for the remote risk prediction service.
//!
//! The service is an opaque fuzzy inference backend reached over HTTP. Its
//! response is not trusted to have any particular shape: every body is
//! classified into an [`Outcome`] instead of being rendered blindly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::form::FormInput;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/predict";

/// The only message shown for transport-level failures
pub const CONNECTION_ERROR: &str = "Erro ao conectar com a API";

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response body is not valid JSON (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Input values as echoed back by the service after it clips them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoedInput {
    pub pressao_sistolica: f64,
    pub pressao_diastolica: f64,
    pub idade: f64,
}

impl EchoedInput {
    pub fn differs_from(&self, sent: &FormInput) -> bool {
        self.pressao_sistolica != sent.systolic
            || self.pressao_diastolica != sent.diastolic
            || self.idade != sent.age
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prediction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_risco: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugestao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrada: Option<EchoedInput>,
}

impl Prediction {
    /// Pull the known fields out of an arbitrary JSON value. Fields that are
    /// missing or have the wrong type come back as `None`.
    pub fn from_value(value: &Value) -> Self {
        Self {
            valor_risco: value.get("valor_risco").and_then(Value::as_f64),
            label: value.get("label").and_then(Value::as_str).map(str::to_owned),
            sugestao: value.get("sugestao").and_then(Value::as_str).map(str::to_owned),
            entrada: value
                .get("entrada")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.valor_risco.is_some() && self.label.is_some() && self.sugestao.is_some()
    }
}

/// Result of one settled submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome {
    Success(Prediction),
    /// Parseable body missing one or more expected fields
    Partial(Prediction),
    /// The service answered with its own `erro` object
    Rejected { status: u16, message: String },
    /// Transport or decode failure
    Failed { message: String },
}

impl Outcome {
    pub fn connection_error() -> Self {
        Outcome::Failed {
            message: CONNECTION_ERROR.to_string(),
        }
    }

    pub fn classify(status: u16, body: &Value) -> Self {
        if let Some(message) = body.get("erro").and_then(Value::as_str) {
            return Outcome::Rejected {
                status,
                message: message.to_string(),
            };
        }

        let prediction = Prediction::from_value(body);
        if prediction.is_complete() {
            Outcome::Success(prediction)
        } else {
            Outcome::Partial(prediction)
        }
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            Outcome::Success(p) | Outcome::Partial(p) => Some(p),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Outcome::Rejected { message, .. } | Outcome::Failed { message } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    /// Without a timeout the transport default applies.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, PredictError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(PredictError::Client)?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one POST with the form values and classify whatever comes back.
    /// The body is parsed regardless of status code.
    pub async fn predict(&self, input: &FormInput) -> Result<Outcome, PredictError> {
        let transport = |source| PredictError::Transport {
            endpoint: self.endpoint.clone(),
            source,
        };

        // `.json()` sets Content-Type: application/json
        let resp = self
            .http
            .post(&self.endpoint)
            .json(input)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status().as_u16();
        let bytes = resp.bytes().await.map_err(transport)?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|source| PredictError::Decode { status, source })?;

        tracing::debug!(status, "prediction service responded");
        Ok(Outcome::classify(status, &body))
    }
}

/// One submission cycle: never fails, errors collapse to the fixed message.
pub async fn submit(client: &PredictionClient, input: FormInput) -> Outcome {
    match client.predict(&input).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!("Prediction request failed: {}", e);
            Outcome::connection_error()
        }
    }
}
