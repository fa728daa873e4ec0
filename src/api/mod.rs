//! API 모듈 - RAG 백엔드와의 요청/응답 계약
//!
//! - Types: `/rag/*`, `/chat/route`, `/chat/query` JSON 구조체
//! - Error: 상태 코드/전송 실패와 `detail` 추출
//! - Client: reqwest 기반 `HttpBackend`

mod client;
mod error;
mod types;

use async_trait::async_trait;

// Re-exports
pub use client::HttpBackend;
pub use error::{extract_detail, ApiError};
pub use types::{
    AnswerResult, DocumentList, HealthStatus, KnowledgeDocument, KnowledgeType, QueryRequest,
    QueryResult, RetrievedDocument, Route, RouteRequest, StoreReceipt, StoreRequest,
};

// ============================================================================
// KnowledgeBackend Trait
// ============================================================================

/// 지식 저장/질의 백엔드 트레이트
///
/// 컨트롤러는 이 트레이트에만 의존하므로 테스트에서 메모리 구현으로 교체할 수 있습니다.
#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    /// 저장된 지식 문서 전체 조회 (`GET /rag/list`)
    async fn list_documents(&self) -> Result<Vec<KnowledgeDocument>, ApiError>;

    /// 지식 문서 저장 (`POST /rag/store`)
    async fn store_document(&self, request: &StoreRequest) -> Result<StoreReceipt, ApiError>;

    /// 지식 문서 삭제 (`DELETE /rag/{id}`)
    async fn delete_document(&self, id: &str) -> Result<(), ApiError>;

    /// 라우팅 질의 (`POST /chat/route`)
    async fn ask(&self, request: &RouteRequest) -> Result<AnswerResult, ApiError>;

    /// 라우팅 없이 항상 RAG로 질의 (`POST /chat/query`)
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult, ApiError>;

    /// 헬스 체크 (`GET /`)
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}
