//! 뷰 모듈 - 뷰 상태를 터미널 텍스트로 렌더링
//!
//! 모든 함수는 순수 함수이며 출력은 CLI가 담당합니다.

use chrono::DateTime;

use crate::api::{KnowledgeDocument, RetrievedDocument};
use crate::controller::{AnswerPanel, RouteLabel, StatusKind, StatusMessage};

/// 점수가 없을 때 표시
pub const SCORE_PLACEHOLDER: &str = "N/A";

/// 관련도 점수 (소수점 3자리)
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{:.3}", value),
        None => SCORE_PLACEHOLDER.to_string(),
    }
}

/// 라우팅 라벨 텍스트
pub fn route_label_text(label: RouteLabel) -> &'static str {
    match label {
        RouteLabel::None => "-",
        RouteLabel::Rag => "RAG",
        RouteLabel::Llm => "LLM",
        RouteLabel::Error => "Error",
    }
}

/// 생성 시각 표시 (파싱 실패 시 원문)
pub fn format_created_at(created_at: Option<&str>) -> String {
    match created_at {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            Err(_) => raw.to_string(),
        },
        None => "-".to_string(),
    }
}

/// 상태 메시지
pub fn render_status(status: &StatusMessage) -> String {
    match status.kind {
        StatusKind::Info => format!("[OK] {}", status.text),
        StatusKind::Error => format!("[!] {}", status.text),
    }
}

/// 저장된 문서 목록
pub fn render_documents(documents: &[KnowledgeDocument], limit: usize) -> String {
    if documents.is_empty() {
        return "[!] 저장된 지식이 없습니다.".to_string();
    }

    let mut out = format!("[OK] 저장된 지식 ({} 건):\n", documents.len());

    for doc in documents.iter().take(limit) {
        let kind = doc.kind.map(|k| k.as_str()).unwrap_or("-");
        out.push_str(&format!("\n  {} [{}]\n", doc.id, kind));
        out.push_str(&format!("        {}\n", truncate_text(&doc.text, 80)));
        out.push_str(&format!(
            "        entity: {} | slot: {} | {}\n",
            doc.entity.as_deref().unwrap_or("-"),
            doc.slot.as_deref().unwrap_or("-"),
            format_created_at(doc.created_at.as_deref())
        ));
    }

    if documents.len() > limit {
        out.push_str(&format!("\n  ... 외 {} 건\n", documents.len() - limit));
    }

    out
}

/// 검색 문서 한 줄
pub fn render_retrieved(index: usize, doc: &RetrievedDocument) -> String {
    format!(
        "{}. [점수: {}] {}",
        index + 1,
        format_score(doc.score),
        truncate_text(&doc.text, 200)
    )
}

/// 답변 패널
pub fn render_answer(answer: &AnswerPanel) -> String {
    let mut out = format!("[경로: {}]\n\n{}\n", route_label_text(answer.route), answer.text);

    if !answer.retrieved.is_empty() {
        out.push_str(&format!("\n검색된 문서 ({} 건):\n", answer.retrieved.len()));
        for (i, doc) in answer.retrieved.iter().enumerate() {
            out.push_str("  ");
            out.push_str(&render_retrieved(i, doc));
            out.push('\n');
        }
    }

    out
}

/// 텍스트 자르기 (UTF-8 안전)
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================
