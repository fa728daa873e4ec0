//! reqwest 기반 백엔드 클라이언트
//!
//! 모든 호출은 단일 요청입니다 (재시도/타임아웃 없음).

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::ApiError;
use super::types::{
    AnswerResult, DocumentList, HealthStatus, KnowledgeDocument, QueryRequest, QueryResult,
    RouteRequest, StoreReceipt, StoreRequest,
};
use super::KnowledgeBackend;

/// HTTP 백엔드
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// 새 클라이언트 생성
    ///
    /// # Arguments
    /// * `base_url` - 백엔드 주소 (예: `http://localhost:8000`)
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rag-compare/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base(base_url),
        })
    }

    /// 기본 URL 반환
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 경로 세그먼트로 엔드포인트 URL 구성 (세그먼트는 퍼센트 인코딩됨)
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

/// 경로 끝에 `/`를 보장 (하위 경로에 배포된 백엔드 지원)
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// 상태 확인 후 본문 텍스트 반환
async fn read_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!("Backend error {}: {}", status, body);
        return Err(ApiError::from_body(status, &body));
    }

    Ok(body)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = read_body(response).await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl KnowledgeBackend for HttpBackend {
    async fn list_documents(&self) -> Result<Vec<KnowledgeDocument>, ApiError> {
        let url = self.endpoint(&["rag", "list"])?;
        tracing::info!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let list: DocumentList = read_json(response).await?;
        Ok(list.documents)
    }

    async fn store_document(&self, request: &StoreRequest) -> Result<StoreReceipt, ApiError> {
        let url = self.endpoint(&["rag", "store"])?;
        tracing::info!("POST {} ({} chars, type={})", url, request.text.len(), request.kind);

        let response = self.client.post(url).json(request).send().await?;
        let body = read_body(response).await?;

        // 성공 본문은 선택 사항
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["rag", id])?;
        tracing::info!("DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        read_body(response).await?;
        Ok(())
    }

    async fn ask(&self, request: &RouteRequest) -> Result<AnswerResult, ApiError> {
        let url = self.endpoint(&["chat", "route"])?;
        tracing::info!("POST {} (threshold={:?})", url, request.threshold);

        let response = self.client.post(url).json(request).send().await?;
        read_json(response).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResult, ApiError> {
        let url = self.endpoint(&["chat", "query"])?;
        tracing::info!("POST {}", url);

        let response = self.client.post(url).json(request).send().await?;
        read_json(response).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.endpoint(&[])?;
        tracing::info!("GET {}", url);

        let response = self.client.get(url).send().await?;
        read_json(response).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        let url = Url::parse(base).expect("invalid test url");
        HttpBackend::new(url).expect("client creation failed")
    }

    #[test]
    fn test_endpoint_from_root() {
        let backend = backend("http://localhost:8000");
        let url = backend.endpoint(&["rag", "list"]).expect("endpoint failed");
        assert_eq!(url.as_str(), "http://localhost:8000/rag/list");
    }

    #[test]
    fn test_endpoint_keeps_sub_path() {
        let backend = backend("https://example.com/api");
        assert_eq!(backend.base_url().as_str(), "https://example.com/api/");

        let url = backend.endpoint(&["chat", "route"]).expect("endpoint failed");
        assert_eq!(url.as_str(), "https://example.com/api/chat/route");
    }

    #[test]
    fn test_delete_id_is_encoded() {
        let backend = backend("http://localhost:8000/");
        let url = backend.endpoint(&["rag", "a/b c"]).expect("endpoint failed");
        assert_eq!(url.as_str(), "http://localhost:8000/rag/a%2Fb%20c");
    }

    #[test]
    fn test_health_endpoint_is_root() {
        let backend = backend("http://localhost:8000");
        let url = backend.endpoint(&[]).expect("endpoint failed");
        assert_eq!(url.as_str(), "http://localhost:8000/");
    }

    /// 요청 하나에 고정 응답을 돌려주는 로컬 서버
    ///
    /// 반환값: (서버 주소, 수신한 요청 헤드 "METHOD PATH")
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind failed");
        let addr = listener.local_addr().expect("local addr failed");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept failed");

            // 헤더 끝까지 읽은 뒤 Content-Length만큼 본문 소비
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let header_end = loop {
                let n = socket.read(&mut chunk).await.expect("read failed");
                if n == 0 {
                    break buf.len();
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.expect("read failed");
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write failed");
            let _ = socket.shutdown().await;

            head.lines()
                .next()
                .and_then(|line| line.rsplit_once(' '))
                .map(|(request_line, _)| request_line.to_string())
                .unwrap_or_default()
        });

        (format!("http://{}", addr), handle)
    }

    fn store_request() -> StoreRequest {
        StoreRequest {
            text: "서울은 한국의 수도다".to_string(),
            entity: None,
            slot: None,
            kind: crate::api::KnowledgeType::Fact,
        }
    }

    #[tokio::test]
    async fn test_store_accepts_empty_success_body() {
        let (base, server) = serve_once("200 OK", "").await;

        let receipt = backend(&base)
            .store_document(&store_request())
            .await
            .expect("store failed");

        assert_eq!(receipt, StoreReceipt::default());
        assert_eq!(server.await.expect("server panicked"), "POST /rag/store");
    }

    #[tokio::test]
    async fn test_store_reads_receipt_message() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"message":"Knowledge stored successfully (1 chunks)."}"#,
        )
        .await;

        let receipt = backend(&base)
            .store_document(&store_request())
            .await
            .expect("store failed");

        assert_eq!(
            receipt.message.as_deref(),
            Some("Knowledge stored successfully (1 chunks).")
        );
        server.await.expect("server panicked");
    }

    #[tokio::test]
    async fn test_store_error_carries_detail() {
        let (base, server) = serve_once("400 Bad Request", r#"{"detail":"x"}"#).await;

        let err = backend(&base)
            .store_document(&store_request())
            .await
            .expect_err("store should fail");

        assert_eq!(err.detail(), Some("x"));
        assert!(matches!(
            err,
            ApiError::Status { status, .. } if status == reqwest::StatusCode::BAD_REQUEST
        ));
        server.await.expect("server panicked");
    }

    #[tokio::test]
    async fn test_delete_not_found_is_error() {
        let (base, server) =
            serve_once("404 Not Found", r#"{"detail":"Document not found"}"#).await;

        let err = backend(&base)
            .delete_document("65a1f0")
            .await
            .expect_err("delete should fail");

        assert_eq!(err.detail(), Some("Document not found"));
        assert_eq!(server.await.expect("server panicked"), "DELETE /rag/65a1f0");
    }

    #[tokio::test]
    async fn test_delete_accepts_message_body() {
        let (base, server) = serve_once("200 OK", r#"{"message":"Document deleted."}"#).await;

        backend(&base)
            .delete_document("65a1f0")
            .await
            .expect("delete failed");
        server.await.expect("server panicked");
    }

    #[tokio::test]
    async fn test_route_answer_decodes() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"answer":"a","route":"rag","retrieved_documents":[{"text":"d","score":0.5}]}"#,
        )
        .await;

        let request = RouteRequest {
            question: "한국의 수도는?".to_string(),
            threshold: Some(0.6),
        };
        let answer = backend(&base).ask(&request).await.expect("ask failed");

        assert_eq!(answer.answer, "a");
        assert_eq!(answer.route, crate::api::Route::Rag);
        assert_eq!(answer.retrieved_documents.len(), 1);
        assert_eq!(answer.retrieved_documents[0].text, "d");
        assert_eq!(answer.retrieved_documents[0].score, Some(0.5));
        assert_eq!(server.await.expect("server panicked"), "POST /chat/route");
    }

    #[tokio::test]
    async fn test_rag_only_query_decodes() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"answer":"b","retrieved_documents":[{"text":"d"}]}"#,
        )
        .await;

        let request = QueryRequest {
            question: "한국의 수도는?".to_string(),
        };
        let result = backend(&base).query(&request).await.expect("query failed");

        assert_eq!(result.answer, "b");
        assert_eq!(result.retrieved_documents[0].score, None);
        assert_eq!(server.await.expect("server panicked"), "POST /chat/query");
    }

    #[tokio::test]
    async fn test_list_with_malformed_body_is_decode_error() {
        let (base, server) = serve_once("200 OK", "not json").await;

        let result = backend(&base).list_documents().await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
        server.await.expect("server panicked");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // 포트 1은 연결 거부됨
        let backend = backend("http://127.0.0.1:1");
        let result = backend.list_documents().await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
