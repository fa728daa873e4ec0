//! 설정 모듈 - 백엔드 주소와 라우팅 임계값
//!
//! 우선순위: 기본값 < 설정 파일 < 환경변수 < CLI 플래그
//! 설정 파일 위치: ~/.rag-compare/config.json (플랫폼별 data_local_dir 우선)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// 기본 백엔드 주소 (로컬 개발 서버)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// 백엔드 주소 환경변수
pub const ENV_BASE_URL: &str = "RAG_COMPARE_BASE_URL";

/// 라우팅 임계값 환경변수
pub const ENV_THRESHOLD: &str = "RAG_COMPARE_THRESHOLD";

/// 설정 에러
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid base url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f32),
}

// ============================================================================
// Data Directory
// ============================================================================

/// 설정 디렉토리 경로 (~/.rag-compare/)
pub fn get_config_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rag-compare")
}

/// 기본 설정 파일 경로
pub fn default_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

// ============================================================================
// ClientConfig
// ============================================================================

/// 클라이언트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `/chat/route` 임계값 (없으면 백엔드 기본값 사용)
    #[serde(default)]
    pub threshold: Option<f32>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            threshold: None,
        }
    }
}

impl ClientConfig {
    /// 기본 위치 설정 파일 + 환경변수로 로드
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&default_config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 설정 파일에서 로드 (파일이 없으면 기본값)
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 환경변수 오버라이드 적용
    ///
    /// 빈 값과 숫자로 해석되지 않는 임계값은 무시합니다.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }

        if let Some(raw) = lookup(ENV_THRESHOLD) {
            match raw.trim().parse::<f32>() {
                Ok(value) => self.threshold = Some(value),
                Err(_) => tracing::warn!("Ignoring non-numeric {}={}", ENV_THRESHOLD, raw),
            }
        }
    }

    /// 검증 후 파싱된 백엔드 URL 반환
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::InvalidThreshold(threshold));
            }
        }

        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
