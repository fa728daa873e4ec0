//! rag-compare - RAG vs LLM 비교 클라이언트
//!
//! 짧은 지식 텍스트를 RAG 백엔드에 저장하고, 질문에 대해
//! 백엔드가 RAG와 LLM 중 어떤 경로로 답했는지 보여줍니다.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod view;

// Re-exports
pub use api::{
    AnswerResult, ApiError, HttpBackend, KnowledgeBackend, KnowledgeDocument, KnowledgeType,
    RetrievedDocument, Route,
};
pub use config::{ClientConfig, ConfigError};
pub use controller::{
    AnswerPanel, KnowledgeForm, RouteLabel, StatusKind, StatusMessage, UiController, ViewState,
};
