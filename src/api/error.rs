//! 백엔드 호출 에러

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// 백엔드 호출 실패
#[derive(Debug, Error)]
pub enum ApiError {
    /// 성공이 아닌 HTTP 상태 (본문의 `detail` 포함)
    #[error("backend returned {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// 네트워크/전송 실패
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 응답 본문 파싱 실패
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// 엔드포인트 URL 구성 실패
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// 사용자에게 보여줄 백엔드 메시지 (있을 때만)
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// 상태 코드 에러 생성 (본문에서 detail 추출)
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            detail: extract_detail(body),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// 에러 본문에서 `detail` 추출
///
/// 문자열이면 그대로, 그 외 JSON 값(검증 에러 목록 등)은 compact 문자열로 변환합니다.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_detail() {
        assert_eq!(
            extract_detail(r#"{"detail":"Document not found"}"#),
            Some("Document not found".to_string())
        );
    }

    #[test]
    fn test_extract_structured_detail() {
        let body = r#"{"detail":[{"loc":["body","text"],"msg":"field required"}]}"#;
        let detail = extract_detail(body).expect("detail missing");
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_extract_detail_missing_or_invalid() {
        assert_eq!(extract_detail(""), None);
        assert_eq!(extract_detail("Internal Server Error"), None);
        assert_eq!(extract_detail(r#"{"message":"x"}"#), None);
        assert_eq!(extract_detail(r#"{"detail":null}"#), None);
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::from_body(StatusCode::BAD_REQUEST, r#"{"detail":"x"}"#);
        assert_eq!(err.detail(), Some("x"));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains('x'));
    }
}
