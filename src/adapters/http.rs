use crate::domain::ports::ReferenceSource;
use crate::utils::error::{IntakeError, Result};
use reqwest::Client;
use url::Url;

/// Fetches reference JSON over HTTP GET relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpReferenceSource {
    base_url: Url,
    client: Client,
}

impl HttpReferenceSource {
    pub fn new(base_url: &str) -> Result<Self> {
        // 確保以 / 結尾，join 時才不會吃掉最後一段路徑
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| IntakeError::InvalidConfigValueError {
            field: "data.location".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    pub fn url_for(&self, name: &str) -> Result<Url> {
        self.base_url
            .join(name)
            .map_err(|e| IntakeError::DataLoadError {
                resource: name.to_string(),
                message: e.to_string(),
            })
    }
}

impl ReferenceSource for HttpReferenceSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.url_for(name)?;
        tracing::debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(IntakeError::DataLoadError {
                resource: name.to_string(),
                message: format!("HTTP error! status: {}", response.status().as_u16()),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_base_url_without_trailing_slash_keeps_last_segment() {
        let source = HttpReferenceSource::new("http://localhost:8000/static/data").unwrap();
        assert_eq!(
            source.url_for("zone.json").unwrap().as_str(),
            "http://localhost:8000/static/data/zone.json"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpReferenceSource::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/static/data/zone.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(r#"{"zone": []}"#);
        });

        let source = HttpReferenceSource::new(&server.url("/static/data/")).unwrap();
        let bytes = source.fetch("zone.json").await.unwrap();

        mock.assert();
        assert_eq!(bytes, br#"{"zone": []}"#.to_vec());
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_load_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/uses.json");
            then.status(404);
        });

        let source = HttpReferenceSource::new(&server.base_url()).unwrap();
        let err = source.fetch("uses.json").await.unwrap_err();

        mock.assert();
        assert!(err.to_string().contains("HTTP error! status: 404"));
    }
}
