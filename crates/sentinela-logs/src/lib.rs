use chrono::{DateTime, Utc};
use reqwest::Client;
use sentinela_core::types::Finding;
use serde::Serialize;
use thiserror::Error;

/// Tipo de erro retornado pelo expedidor.
#[derive(Debug, Error)]
pub enum ShipError {
    #[error("erro ao enviar entrada: {0}")]
    Request(#[from] reqwest::Error),
}

/// Entrada de log enviada ao coletor.
#[derive(Serialize)]
struct LogEntry<'a> {
    level: &'a str,
    message: &'a str,
    detector: &'a str,
    timestamp: DateTime<Utc>,
}

/// Alerta enviado ao coletor.
#[derive(Serialize)]
struct AlertEntry<'a> {
    #[serde(flatten)]
    finding: &'a Finding,
    timestamp: DateTime<Utc>,
}

/// Cliente simples para envio de alertas e logs a um coletor HTTP.
pub struct AlertShipper {
    endpoint: String,
    client: Client,
}

impl AlertShipper {
    /// Cria uma nova instância apontando para a `endpoint` do coletor.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }

    /// Envia uma entrada de log para o coletor.
    pub async fn ship(&self, level: &str, message: &str, detector: &str) -> Result<(), ShipError> {
        let entry = LogEntry {
            level,
            message,
            detector,
            timestamp: Utc::now(),
        };
        self.client
            .post(&self.endpoint)
            .json(&entry)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Envia um alerta emitido por um detector.
    pub async fn ship_finding(&self, finding: &Finding) -> Result<(), ShipError> {
        let entry = AlertEntry {
            finding,
            timestamp: Utc::now(),
        };
        self.client
            .post(&self.endpoint)
            .json(&entry)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinela_core::types::{FindingType, Severity};
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn ship_log_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({
                "level": "info",
                "message": "test",
                "detector": "detector",
            })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let shipper = AlertShipper::new(server.uri());
        let result = shipper.ship("info", "test", "detector").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn ship_finding_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({ "alert_id": "TEST-1" })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let finding = Finding {
            name: "Test Detector".to_string(),
            description: "test".to_string(),
            alert_id: "TEST-1".to_string(),
            severity: Severity::Info,
            finding_type: FindingType::Info,
            protocol: "ethereum".to_string(),
            metadata: HashMap::new(),
        };

        let shipper = AlertShipper::new(server.uri());
        assert!(shipper.ship_finding(&finding).await.is_ok());
    }
}
