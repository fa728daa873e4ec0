//! UI 컨트롤러 - 뷰 상태 + 백엔드 요청 중재
//!
//! 하나의 `ViewState`를 소유하고 네 가지 요청(목록/저장/삭제/질의)을 처리합니다.
//! 문서 목록은 항상 백엔드에서 전체 재조회하며, 로컬에서 낙관적으로 수정하지 않습니다.

use crate::api::{
    AnswerResult, ApiError, KnowledgeBackend, KnowledgeDocument, KnowledgeType, QueryRequest,
    RetrievedDocument, Route, RouteRequest, StoreRequest,
};

/// 지식 텍스트가 비었을 때 메시지
pub const MSG_EMPTY_KNOWLEDGE: &str = "지식 텍스트를 입력해주세요.";
/// 질문이 비었을 때 메시지
pub const MSG_EMPTY_QUESTION: &str = "질문을 입력해주세요.";
/// 저장 성공 기본 메시지
pub const MSG_STORED: &str = "지식이 저장되었습니다.";
/// 삭제 성공 메시지
pub const MSG_DELETED: &str = "문서가 삭제되었습니다.";

const FALLBACK_STORE_ERROR: &str = "저장 중 오류가 발생했습니다.";
const FALLBACK_DELETE_ERROR: &str = "삭제 중 오류가 발생했습니다.";
const FALLBACK_ASK_ERROR: &str = "답변을 가져오지 못했습니다.";

// ============================================================================
// View State
// ============================================================================

/// 상태 메시지 스타일
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// 저장/삭제 결과를 보여주는 상태 메시지 (하나의 슬롯 공유)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// 지식 입력 폼
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeForm {
    pub text: String,
    pub entity: String,
    pub slot: String,
    pub kind: KnowledgeType,
}

impl KnowledgeForm {
    /// 요청 본문으로 변환 (빈 선택 필드는 None)
    ///
    /// 텍스트가 공백뿐이면 None을 반환합니다.
    pub fn to_request(&self) -> Option<StoreRequest> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }

        Some(StoreRequest {
            text: text.to_string(),
            entity: non_blank(&self.entity),
            slot: non_blank(&self.slot),
            kind: self.kind,
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 라우팅 라벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteLabel {
    /// 아직 질문하지 않음
    #[default]
    None,
    Rag,
    Llm,
    Error,
}

impl From<Route> for RouteLabel {
    fn from(route: Route) -> Self {
        match route {
            Route::Rag => RouteLabel::Rag,
            Route::Llm => RouteLabel::Llm,
        }
    }
}

/// 답변 패널 (질문마다 통째로 교체)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerPanel {
    pub text: String,
    pub route: RouteLabel,
    pub retrieved: Vec<RetrievedDocument>,
}

/// 컨트롤러가 소유하는 전체 뷰 상태
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub documents: Vec<KnowledgeDocument>,
    pub form: KnowledgeForm,
    pub status: Option<StatusMessage>,
    pub answer: AnswerPanel,
}

// ============================================================================
// UiController
// ============================================================================

/// UI 컨트롤러
///
/// 모든 연산이 `&mut self`를 받으므로 한 컨트롤러에서 요청이 겹치지 않습니다.
pub struct UiController<B: KnowledgeBackend> {
    backend: B,
    threshold: Option<f32>,
    state: ViewState,
}

impl<B: KnowledgeBackend> UiController<B> {
    /// 새 컨트롤러 생성
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            threshold: None,
            state: ViewState::default(),
        }
    }

    /// `/chat/route` 임계값 지정
    pub fn with_threshold(mut self, threshold: Option<f32>) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn form_mut(&mut self) -> &mut KnowledgeForm {
        &mut self.state.form
    }

    pub fn set_form(&mut self, form: KnowledgeForm) {
        self.state.form = form;
    }

    pub fn clear_status(&mut self) {
        self.state.status = None;
    }

    /// 문서 목록 새로고침
    ///
    /// 실패하면 조용히 빈 목록으로 대체합니다.
    pub async fn list_documents(&mut self) {
        match self.backend.list_documents().await {
            Ok(documents) => {
                tracing::debug!("Loaded {} documents", documents.len());
                self.state.documents = documents;
            }
            Err(e) => {
                tracing::warn!("Document list failed, showing empty list: {}", e);
                self.state.documents.clear();
            }
        }
    }

    /// 폼 내용을 지식으로 저장
    ///
    /// 성공 시 폼 초기화 후 목록을 한 번 새로고침합니다.
    /// 실패 시 폼은 그대로 두고 에러 메시지를 표시합니다.
    pub async fn store_document(&mut self) {
        let Some(request) = self.state.form.to_request() else {
            self.state.status = Some(StatusMessage::error(MSG_EMPTY_KNOWLEDGE));
            return;
        };

        match self.backend.store_document(&request).await {
            Ok(receipt) => {
                let message = receipt.message.unwrap_or_else(|| MSG_STORED.to_string());
                tracing::debug!("Stored knowledge: {}", message);
                self.state.form = KnowledgeForm::default();
                self.state.status = Some(StatusMessage::info(message));
                self.list_documents().await;
            }
            Err(e) => {
                tracing::warn!("Store failed: {}", e);
                self.state.status = Some(StatusMessage::error(failure_message(
                    "저장 실패",
                    &e,
                    FALLBACK_STORE_ERROR,
                )));
            }
        }
    }

    /// 문서 삭제
    ///
    /// 성공했을 때만 목록을 새로고침합니다.
    pub async fn delete_document(&mut self, id: &str) {
        match self.backend.delete_document(id).await {
            Ok(()) => {
                tracing::debug!("Deleted document {}", id);
                self.state.status = Some(StatusMessage::info(MSG_DELETED));
                self.list_documents().await;
            }
            Err(e) => {
                tracing::warn!("Delete of {} failed: {}", id, e);
                self.state.status = Some(StatusMessage::error(failure_message(
                    "삭제 실패",
                    &e,
                    FALLBACK_DELETE_ERROR,
                )));
            }
        }
    }

    /// 질문 후 답변 패널 갱신
    pub async fn ask_question(&mut self, question: &str) {
        let Some(question) = self.validate_question(question) else {
            return;
        };

        let request = RouteRequest {
            question,
            threshold: self.threshold,
        };
        let result = self.backend.ask(&request).await;
        self.show_answer(result);
    }

    /// 라우팅 없이 RAG로만 질문 (`/chat/query`)
    ///
    /// 같은 질문의 라우팅 결과와 비교할 때 사용합니다.
    pub async fn ask_rag_only(&mut self, question: &str) {
        let Some(question) = self.validate_question(question) else {
            return;
        };

        let request = QueryRequest { question };
        let result = self.backend.query(&request).await.map(AnswerResult::from);
        self.show_answer(result);
    }

    /// 빈 질문이면 검증 메시지를 표시하고 None
    fn validate_question(&mut self, question: &str) -> Option<String> {
        let question = question.trim();
        if question.is_empty() {
            self.state.answer = AnswerPanel {
                text: MSG_EMPTY_QUESTION.to_string(),
                ..AnswerPanel::default()
            };
            return None;
        }
        Some(question.to_string())
    }

    fn show_answer(&mut self, result: Result<AnswerResult, ApiError>) {
        self.state.answer = match result {
            Ok(result) => {
                tracing::debug!(
                    "Answered via {:?} with {} retrieved documents",
                    result.route,
                    result.retrieved_documents.len()
                );
                AnswerPanel {
                    text: result.answer,
                    route: result.route.into(),
                    retrieved: result.retrieved_documents,
                }
            }
            Err(e) => {
                tracing::warn!("Question failed: {}", e);
                AnswerPanel {
                    text: failure_message("오류", &e, FALLBACK_ASK_ERROR),
                    route: RouteLabel::Error,
                    retrieved: Vec::new(),
                }
            }
        };
    }

    /// 백엔드 헬스 체크
    pub async fn check_health(&self) -> Result<String, ApiError> {
        Ok(self.backend.health().await?.status)
    }
}

/// 백엔드 detail이 있으면 사용하고, 없으면 기본 메시지
fn failure_message(prefix: &str, error: &ApiError, fallback: &str) -> String {
    match error.detail() {
        Some(detail) => format!("{}: {}", prefix, detail),
        None => fallback.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
