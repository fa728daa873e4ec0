//! 백엔드 API 와이어 타입
//!
//! `/rag/*`, `/chat/route`, `/chat/query` 엔드포인트가 주고받는 JSON 구조체입니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Knowledge Documents
// ============================================================================

/// 지식 유형 (fact / history / summary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeType {
    #[default]
    Fact,
    History,
    Summary,
}

impl KnowledgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeType::Fact => "fact",
            KnowledgeType::History => "history",
            KnowledgeType::Summary => "summary",
        }
    }
}

impl fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnowledgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fact" => Ok(KnowledgeType::Fact),
            "history" => Ok(KnowledgeType::History),
            "summary" => Ok(KnowledgeType::Summary),
            other => Err(format!(
                "알 수 없는 지식 유형: '{}' (fact, history, summary 중 선택)",
                other
            )),
        }
    }
}

/// 백엔드에 저장된 지식 문서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<KnowledgeType>,
    /// ISO-8601 문자열 (백엔드가 null을 보낼 수 있음)
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `GET /rag/list` 응답
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<KnowledgeDocument>,
}

/// `POST /rag/store` 요청 본문
///
/// 선택 필드는 비어 있어도 `null`로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreRequest {
    pub text: String,
    pub entity: Option<String>,
    pub slot: Option<String>,
    #[serde(rename = "type")]
    pub kind: KnowledgeType,
}

/// `POST /rag/store` 성공 응답
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoreReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Routed Answers
// ============================================================================

/// 백엔드의 라우팅 결정
///
/// `"rag"`만 RAG로 취급하고 나머지 값은 모두 LLM입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Route {
    Rag,
    Llm,
}

impl From<String> for Route {
    fn from(value: String) -> Self {
        Route::from(value.as_str())
    }
}

impl From<&str> for Route {
    fn from(value: &str) -> Self {
        if value == "rag" {
            Route::Rag
        } else {
            Route::Llm
        }
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        match route {
            Route::Rag => "rag".to_string(),
            Route::Llm => "llm".to_string(),
        }
    }
}

/// 답변 생성에 사용된 검색 문서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// `POST /chat/route` 요청 본문
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

/// `POST /chat/route` 응답
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub route: Route,
    #[serde(default)]
    pub retrieved_documents: Vec<RetrievedDocument>,
}

/// `POST /chat/query` 요청 본문 (항상 RAG 경로)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub question: String,
}

/// `POST /chat/query` 응답 (`route` 없음)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    #[serde(default)]
    pub retrieved_documents: Vec<RetrievedDocument>,
}

impl From<QueryResult> for AnswerResult {
    fn from(result: QueryResult) -> Self {
        AnswerResult {
            answer: result.answer,
            route: Route::Rag,
            retrieved_documents: result.retrieved_documents,
        }
    }
}

/// `GET /` 헬스 체크 응답
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

// ============================================================================
// Tests
// ============================================================================
