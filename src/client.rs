use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ServiceError;
use crate::model::{ExportFormat, ProcessResult, SelectedFile, UploadHandle};

const PROCESS_TYPE: &str = "all";

#[derive(Serialize)]
struct ExportRequest<'a> {
    file_id: &'a str,
    format: ExportFormat,
    content: &'a str,
}

/// Error body shape: `{"detail": "..."}`. Validation errors carry a list instead of a string.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// HTTP binding for the processing service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base: Url,
}

impl ServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| ServiceError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Self::new(
            &config.backend_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|e| ServiceError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Ping the service root.
    pub async fn health(&self) -> Result<(), ServiceError> {
        let resp = self.http.get(self.base.clone()).send().await?;
        check(resp).await?;
        Ok(())
    }

    /// Send the file as a single multipart field named `file`.
    pub async fn upload(&self, file: &SelectedFile) -> Result<UploadHandle, ServiceError> {
        let part = Part::stream_with_length(file.bytes.clone(), file.size_bytes())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(self.endpoint("api/upload")?)
            .multipart(form)
            .send()
            .await?;
        let handle: UploadHandle = check(resp).await?.json().await?;
        log::info!("Uploaded {} as {}", file.name, handle.file_id);
        Ok(handle)
    }

    /// Run OCR, description and speech synthesis for an uploaded file.
    pub async fn process(&self, handle: &UploadHandle) -> Result<ProcessResult, ServiceError> {
        let resp = self
            .http
            .post(self.endpoint("api/process")?)
            .query(&[
                ("file_id", handle.file_id.as_str()),
                ("process_type", PROCESS_TYPE),
            ])
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    /// Ask the service to render `content` in `format`. The body is the file itself.
    pub async fn export(
        &self,
        file_id: &str,
        format: ExportFormat,
        content: &str,
    ) -> Result<Bytes, ServiceError> {
        let body = ExportRequest {
            file_id,
            format,
            content,
        };
        let resp = self
            .http
            .post(self.endpoint("api/export")?)
            .json(&body)
            .send()
            .await?;
        Ok(check(resp).await?.bytes().await?)
    }

    /// Absolute http(s) links pass through; anything else is relative to the service origin.
    pub fn resolve_audio_url(&self, reference: &str) -> Option<Url> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if let Ok(url) = Url::parse(reference) {
            if matches!(url.scheme(), "http" | "https") {
                return Some(url);
            }
        }
        self.base.join(reference.trim_start_matches('/')).ok()
    }
}

/// Turn a non-2xx response into `ServiceError::Status`, keeping the server's detail.
async fn check(resp: Response) -> Result<Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.detail)
        .map(|value| match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
    Err(ServiceError::Status { status, detail })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(url: &str) -> ServiceClient {
        ServiceClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn rejects_malformed_base_url() {
        let err = ServiceClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidUrl(_)));
    }

    #[test]
    fn resolves_relative_audio_against_origin() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.resolve_audio_url("audio/clip.mp3").unwrap().as_str(),
            "http://localhost:8000/audio/clip.mp3"
        );
        assert_eq!(
            c.resolve_audio_url("/outputs/abc.mp3").unwrap().as_str(),
            "http://localhost:8000/outputs/abc.mp3"
        );
        assert_eq!(
            c.resolve_audio_url("https://cdn.example.com/a.mp3").unwrap().as_str(),
            "https://cdn.example.com/a.mp3"
        );
        assert!(c.resolve_audio_url("  ").is_none());
    }

    #[test]
    fn keeps_base_path_prefix() {
        let c = client("http://host/voxaccess");
        assert_eq!(
            c.endpoint("api/upload").unwrap().as_str(),
            "http://host/voxaccess/api/upload"
        );
        assert_eq!(
            c.resolve_audio_url("outputs/a.mp3").unwrap().as_str(),
            "http://host/voxaccess/outputs/a.mp3"
        );
    }

    #[tokio::test]
    async fn upload_sends_multipart_and_reads_file_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".into()),
            )
            .match_body(Matcher::Regex(r#"name="file"; filename="photo.jpg""#.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"file_id":"abc123"}"#)
            .create_async()
            .await;

        let file = SelectedFile::new("photo.jpg", "image/jpeg", b"jpeg-bytes".to_vec());
        let handle = client(&server.url()).upload(&file).await.unwrap();

        assert_eq!(handle.file_id, "abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn process_passes_id_and_mode_as_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/process")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("file_id".into(), "abc123".into()),
                Matcher::UrlEncoded("process_type".into(), "all".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text":"Hello world","word_count":2,"audio_url":"outputs/abc123.mp3"}"#)
            .create_async()
            .await;

        let handle = UploadHandle {
            file_id: "abc123".into(),
        };
        let result = client(&server.url()).process(&handle).await.unwrap();

        assert_eq!(result.text.as_deref(), Some("Hello world"));
        assert_eq!(result.word_count, Some(2));
        assert!(result.description.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_detail_is_extracted() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/process")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"OCR engine unavailable"}"#)
            .create_async()
            .await;

        let handle = UploadHandle {
            file_id: "abc123".into(),
        };
        let err = client(&server.url()).process(&handle).await.unwrap_err();
        match err {
            ServiceError::Status { status, detail } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(detail.as_deref(), Some("OCR engine unavailable"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_text_error_has_no_detail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/upload")
            .with_status(413)
            .with_body("too large")
            .create_async()
            .await;

        let file = SelectedFile::new("scan.pdf", "application/pdf", b"%PDF".to_vec());
        let err = client(&server.url()).upload(&file).await.unwrap_err();
        assert!(err.detail().is_none());
        assert!(err.to_string().contains("413"));
    }

    #[tokio::test]
    async fn export_posts_json_and_returns_raw_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/export")
            .match_body(Matcher::Json(serde_json::json!({
                "file_id": "abc123",
                "format": "srt",
                "content": "Hello world",
            })))
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body("1\n00:00:00,000 --> 00:00:02,000\nHello world\n")
            .create_async()
            .await;

        let bytes = client(&server.url())
            .export("abc123", ExportFormat::Srt, "Hello world")
            .await
            .unwrap();

        assert!(bytes.starts_with(b"1\n00:00:00"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn health_checks_root() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"message":"ok"}"#)
            .create_async()
            .await;

        client(&server.url()).health().await.unwrap();
        mock.assert_async().await;
    }
}
