use crate::domain::model::{Ack, FormPayload};
use crate::domain::ports::Submitter;
use crate::utils::error::{IntakeError, Result, SubmitError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 送出策略；依端點能力選擇，不會自動切換
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStrategy {
    /// JSON body, reads a `{status, message}` reply.
    Json,
    /// Multipart form data, reads a `{status, message}` reply.
    #[default]
    Multipart,
    /// JSON body, reply ignored; success once the request resolves.
    FireAndForget,
}

#[derive(Debug, Deserialize)]
struct AckBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
}

fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

fn transport(error: reqwest::Error) -> SubmitError {
    SubmitError::Transport(error.to_string())
}

/// Reads the `{status, message}` reply shared by the JSON and multipart endpoints.
async fn read_ack(response: Response) -> std::result::Result<Ack, SubmitError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SubmitError::Status(status.as_u16()));
    }

    let body: AckBody = response
        .json()
        .await
        .map_err(|e| SubmitError::Decode(e.to_string()))?;

    if body.status == "success" {
        Ok(Ack {
            message: body.message,
        })
    } else {
        Err(SubmitError::Rejected(
            body.message
                .unwrap_or_else(|| "Unknown error occurred".to_string()),
        ))
    }
}

pub struct JsonSubmitter {
    endpoint: String,
    client: Client,
}

impl JsonSubmitter {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl Submitter for JsonSubmitter {
    async fn submit(&self, payload: &FormPayload) -> std::result::Result<Ack, SubmitError> {
        tracing::debug!("POST {} (json, {} fields)", self.endpoint, payload.fields.len());
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload.to_json())
            .send()
            .await
            .map_err(transport)?;
        read_ack(response).await
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

pub struct MultipartSubmitter {
    endpoint: String,
    client: Client,
}

impl MultipartSubmitter {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            client: build_client(timeout)?,
        })
    }

    fn form(payload: &FormPayload) -> std::result::Result<Form, SubmitError> {
        let mut form = Form::new();
        for (key, value) in &payload.fields {
            form = form.text(key.clone(), value.clone());
        }
        for (key, file) in &payload.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)
                .map_err(|e| SubmitError::Transport(e.to_string()))?;
            form = form.part(key.clone(), part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Submitter for MultipartSubmitter {
    async fn submit(&self, payload: &FormPayload) -> std::result::Result<Ack, SubmitError> {
        tracing::debug!(
            "POST {} (multipart, {} fields, {} files)",
            self.endpoint,
            payload.fields.len(),
            payload.files.len()
        );
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::form(payload)?)
            .send()
            .await
            .map_err(transport)?;
        read_ack(response).await
    }

    fn name(&self) -> &'static str {
        "multipart"
    }
}

/// Apps Script style: the reply is opaque, only transport errors count.
pub struct FireAndForgetSubmitter {
    endpoint: String,
    client: Client,
}

impl FireAndForgetSubmitter {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl Submitter for FireAndForgetSubmitter {
    async fn submit(&self, payload: &FormPayload) -> std::result::Result<Ack, SubmitError> {
        tracing::debug!("POST {} (fire-and-forget)", self.endpoint);
        self.client
            .post(&self.endpoint)
            .json(&payload.to_json())
            .send()
            .await
            .map_err(|e| SubmitError::Transport(format!("Failed to submit form: {}", e)))?;
        Ok(Ack { message: None })
    }

    fn name(&self) -> &'static str {
        "fire_and_forget"
    }
}

/// Prints the payload instead of posting it.
pub struct DryRunSubmitter;

#[async_trait]
impl Submitter for DryRunSubmitter {
    async fn submit(&self, payload: &FormPayload) -> std::result::Result<Ack, SubmitError> {
        let body = serde_json::to_string_pretty(&payload.to_json())
            .map_err(|e| SubmitError::Decode(e.to_string()))?;
        println!("{}", body);
        Ok(Ack {
            message: Some("dry run".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "dry_run"
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

pub fn build_submitter(
    strategy: SubmitStrategy,
    endpoint: &str,
    timeout: Option<Duration>,
) -> std::result::Result<Box<dyn Submitter>, IntakeError> {
    tracing::debug!("Using {:?} submission strategy for {}", strategy, endpoint);
    Ok(match strategy {
        SubmitStrategy::Json => Box::new(JsonSubmitter::new(endpoint, timeout)?),
        SubmitStrategy::Multipart => Box::new(MultipartSubmitter::new(endpoint, timeout)?),
        SubmitStrategy::FireAndForget => Box::new(FireAndForgetSubmitter::new(endpoint, timeout)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FileUpload;
    use httpmock::prelude::*;

    fn payload() -> FormPayload {
        let mut payload = FormPayload::default();
        payload.set("applicant_name", "Ravi Patil");
        payload.set("contact_no", "9876543210");
        payload
    }

    #[tokio::test]
    async fn test_json_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/submit")
                .header("content-type", "application/json")
                .json_body_partial(r#"{"applicant_name": "Ravi Patil"}"#);
            then.status(200)
                .json_body(serde_json::json!({"status": "success", "message": "saved"}));
        });

        let submitter = JsonSubmitter::new(&server.url("/submit"), None).unwrap();
        let ack = submitter.submit(&payload()).await.unwrap();

        mock.assert();
        assert_eq!(ack.message.as_deref(), Some("saved"));
    }

    #[tokio::test]
    async fn test_json_rejection_carries_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/submit");
            then.status(200)
                .json_body(serde_json::json!({"status": "error", "message": "duplicate entry"}));
        });

        let submitter = JsonSubmitter::new(&server.url("/submit"), None).unwrap();
        let err = submitter.submit(&payload()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected(ref m) if m == "duplicate entry"));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/submit");
            then.status(500)
                .json_body(serde_json::json!({"success": false, "message": "db down"}));
        });

        let submitter = MultipartSubmitter::new(&server.url("/submit"), None).unwrap();
        let err = submitter.submit(&payload()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Status(500)));
    }

    #[tokio::test]
    async fn test_multipart_sends_text_and_file_parts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/submit")
                .header_exists("content-type")
                .body_contains("name=\"applicant_name\"")
                .body_contains("Ravi Patil")
                .body_contains("filename=\"plan.png\"");
            then.status(200).json_body(serde_json::json!({"status": "success"}));
        });

        let mut payload = payload();
        payload.files.push((
            "dp_rp_part_plan".to_string(),
            FileUpload::new("plan.png", "image/png", b"png-bytes".to_vec()),
        ));

        let submitter = MultipartSubmitter::new(&server.url("/submit"), None).unwrap();
        let ack = submitter.submit(&payload).await.unwrap();

        mock.assert();
        assert_eq!(ack.message, None);
    }

    #[tokio::test]
    async fn test_fire_and_forget_ignores_reply() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/exec");
            then.status(200).body("<html>opaque</html>");
        });

        let submitter = FireAndForgetSubmitter::new(&server.url("/exec"), None).unwrap();
        assert!(submitter.submit(&payload()).await.is_ok());
        mock.assert();
    }

    #[tokio::test]
    async fn test_fire_and_forget_reports_transport_errors() {
        let submitter = FireAndForgetSubmitter::new("http://127.0.0.1:9/exec", None).unwrap();
        let err = submitter.submit(&payload()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Transport(_)));
    }
}
