//! HTTP client for the script-generation backend

use super::{Brief, Generated, GenerationError, ScriptRequest, ScriptResponse};
use crate::config::GenerationConfig;
use serde::Deserialize;

/// Error body the backend sends with non-2xx answers
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Calls `POST {api_url}/generate`
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: String,
    defaults: GenerationConfig,
}

impl HttpSource {
    pub fn new(api_url: &str, defaults: &GenerationConfig) -> Result<Self, GenerationError> {
        // Generation can take a while on the slow model path
        let client = reqwest::Client::builder()
            .timeout(defaults.timeout())
            .build()?;
        Ok(Self::with_client(client, api_url, defaults))
    }

    /// Use a pre-built client (custom TLS, proxies)
    pub fn with_client(client: reqwest::Client, api_url: &str, defaults: &GenerationConfig) -> Self {
        Self {
            client,
            endpoint: format!("{}/generate", api_url.trim_end_matches('/')),
            defaults: defaults.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the request body: brief fields plus configured defaults
    pub fn request_for(&self, brief: &Brief) -> ScriptRequest {
        let industry = brief.industry.clone().filter(|i| !i.trim().is_empty());
        let tones = (!brief.tones.is_empty()).then(|| brief.tones.clone());
        let dialect = brief
            .dialect
            .clone()
            .or_else(|| self.defaults.dialect.clone())
            .filter(|d| !d.is_empty() && d != "standard");

        ScriptRequest {
            prompt: brief.prompt.clone(),
            product_name: brief.product_name.clone(),
            industry,
            tones,
            duration: self.defaults.duration.clone(),
            ad_type: self.defaults.ad_type.clone(),
            turbo: self.defaults.turbo,
            dialect,
        }
    }

    /// Generate one script
    pub async fn generate(&self, brief: &Brief) -> Result<Generated, GenerationError> {
        if brief.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let body = self.request_for(brief);
        tracing::info!(
            endpoint = %self.endpoint,
            industry = ?body.industry,
            tones = ?body.tones,
            dialect = ?body.dialect,
            "Requesting script"
        );

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .and_then(|detail| match detail {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) if s.is_empty() => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                });
            let message = detail.unwrap_or_else(|| format!("Server error ({})", status.as_u16()));
            tracing::warn!(status = status.as_u16(), "Generation failed: {}", message);
            return Err(GenerationError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ScriptResponse = response.json().await?;
        let generated = Generated::from(parsed);

        match &generated.warning {
            Some(warning) => tracing::warn!("Backend warning: {}", warning.message()),
            None => tracing::debug!(
                chars = generated.document.char_len(),
                id = ?generated.script_id,
                "Script received"
            ),
        }
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Warning, FALLBACK_SCRIPT};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let task = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then exactly Content-Length bytes of body
            let body_start = loop {
                let n = stream.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let headers = String::from_utf8_lossy(&raw[..body_start]).to_lowercase();
            let length: usize = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            while raw.len() < body_start + length {
                let n = stream.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
            }

            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw[body_start..]).into_owned()
        });

        (url, task)
    }

    /// Direct client so a proxy set in the environment can't intercept localhost
    fn local_source(url: &str) -> HttpSource {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpSource::with_client(client, url, &GenerationConfig::default())
    }

    fn brief() -> Brief {
        Brief {
            prompt: "Launch ad for a bKash savings plan".into(),
            industry: Some("Fintech".into()),
            tones: vec!["Emotional".into(), "Witty".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_request_body_defaults() {
        let source = HttpSource::new("http://localhost:8000/", &GenerationConfig::default()).unwrap();
        assert_eq!(source.endpoint(), "http://localhost:8000/generate");

        let body = serde_json::to_value(source.request_for(&brief())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "prompt": "Launch ad for a bKash savings plan",
                "product_name": null,
                "industry": "Fintech",
                "tones": ["Emotional", "Witty"],
                "duration": "45 seconds",
                "ad_type": "TVC",
                "turbo": true,
                "dialect": null
            })
        );
    }

    #[test]
    fn test_request_body_empty_fields_become_null() {
        let config = GenerationConfig {
            dialect: Some("chatgaiya".into()),
            ..Default::default()
        };
        let source = HttpSource::new("http://x", &config).unwrap();

        let mut brief = Brief::new("p");
        brief.industry = Some("  ".into());
        let body = source.request_for(&brief);
        assert_eq!(body.industry, None);
        assert_eq!(body.tones, None);
        assert_eq!(body.dialect.as_deref(), Some("chatgaiya"));

        brief.dialect = Some("standard".into());
        assert_eq!(source.request_for(&brief).dialect, None);
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected_before_request() {
        // Nothing listens here; an attempted request would be a Request error
        let source = HttpSource::new("http://127.0.0.1:9", &GenerationConfig::default()).unwrap();
        let err = source.generate(&Brief::new("   \n")).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyPrompt));
    }

    #[tokio::test]
    async fn test_generate_success() {
        let (url, server) = serve_once(
            "200 OK",
            r##"{"script":"# Spot","warning":"CRITICAL_QUOTA_EXHAUSTED","db_id":7}"##,
        )
        .await;
        let source = local_source(&url);

        let generated = source.generate(&brief()).await.unwrap();
        assert_eq!(generated.document.as_str(), "# Spot");
        assert_eq!(generated.warning, Some(Warning::QuotaExhausted));
        assert_eq!(generated.script_id.as_deref(), Some("7"));

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["prompt"], "Launch ad for a bKash savings plan");
        assert_eq!(sent["turbo"], true);
    }

    #[tokio::test]
    async fn test_generate_missing_script_uses_fallback() {
        let (url, _server) = serve_once("200 OK", r#"{"warning":null}"#).await;
        let source = local_source(&url);

        let generated = source.generate(&brief()).await.unwrap();
        assert_eq!(generated.document.as_str(), FALLBACK_SCRIPT);
    }

    #[tokio::test]
    async fn test_server_detail_becomes_message() {
        let (url, _server) = serve_once(
            "503 Service Unavailable",
            r#"{"detail":"Model overloaded"}"#,
        )
        .await;
        let source = local_source(&url);

        let err = source.generate(&brief()).await.unwrap_err();
        assert_eq!(err.to_string(), "Model overloaded");
        assert!(matches!(err, GenerationError::Server { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_server_error_without_detail() {
        let (url, _server) = serve_once("500 Internal Server Error", "oops").await;
        let source = local_source(&url);

        let err = source.generate(&brief()).await.unwrap_err();
        assert_eq!(err.to_string(), "Server error (500)");
    }
}
