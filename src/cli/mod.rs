//! CLI 모듈
//!
//! rag-compare CLI 명령어 정의 및 구현

mod shell;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::api::{HttpBackend, KnowledgeType};
use crate::config::{default_config_path, ClientConfig};
use crate::controller::{KnowledgeForm, RouteLabel, StatusMessage, UiController};
use crate::view;

pub use shell::{parse_shell_line, ShellCommand};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "rag-compare")]
#[command(version, about = "RAG vs LLM 비교 클라이언트", long_about = None)]
pub struct Cli {
    /// 백엔드 주소 (설정 파일/환경변수보다 우선)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// RAG 라우팅 임계값 (0.0 ~ 1.0)
    #[arg(long, global = true)]
    pub threshold: Option<f32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 저장된 지식 목록
    List {
        /// 표시 개수 제한
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// 지식 저장
    Store {
        /// 저장할 지식 텍스트
        #[arg(short, long)]
        text: String,

        /// 대상 엔티티
        #[arg(short, long)]
        entity: Option<String>,

        /// 정보 슬롯 이름
        #[arg(short, long)]
        slot: Option<String>,

        /// 지식 유형 (fact / history / summary)
        #[arg(long = "type", default_value = "fact")]
        kind: KnowledgeType,
    },

    /// 지식 삭제
    Delete {
        /// 삭제할 문서 ID
        id: String,
    },

    /// 질문 (RAG/LLM 라우팅)
    Ask {
        /// 질문 내용
        question: String,

        /// 라우팅 없이 항상 RAG로 답변 (`/chat/query`)
        #[arg(long)]
        rag_only: bool,
    },

    /// 상태 확인
    Status,

    /// 대화형 셸
    Shell,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::load().context("설정 로드 실패")?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    if cli.threshold.is_some() {
        config.threshold = cli.threshold;
    }

    let base_url = config.validate().context("잘못된 설정")?;
    let backend = HttpBackend::new(base_url).context("HTTP 클라이언트 생성 실패")?;
    let controller = UiController::new(backend).with_threshold(config.threshold);

    match cli.command {
        Commands::List { limit } => cmd_list(controller, limit).await,
        Commands::Store {
            text,
            entity,
            slot,
            kind,
        } => {
            let form = KnowledgeForm {
                text,
                entity: entity.unwrap_or_default(),
                slot: slot.unwrap_or_default(),
                kind,
            };
            cmd_store(controller, form).await
        }
        Commands::Delete { id } => cmd_delete(controller, &id).await,
        Commands::Ask { question, rag_only } => cmd_ask(controller, &question, rag_only).await,
        Commands::Status => cmd_status(controller, &config).await,
        Commands::Shell => shell::run_shell(controller).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

type Controller = UiController<HttpBackend>;

/// 목록 명령어 (list)
///
/// 조회 실패 시에도 빈 목록으로 표시합니다.
async fn cmd_list(mut controller: Controller, limit: usize) -> Result<()> {
    controller.list_documents().await;
    println!("{}", view::render_documents(&controller.state().documents, limit));
    Ok(())
}

/// 저장 명령어 (store)
async fn cmd_store(mut controller: Controller, form: KnowledgeForm) -> Result<()> {
    controller.set_form(form);
    println!("[*] 지식 저장 중...");
    controller.store_document().await;
    report_status(controller.state().status.as_ref())?;

    println!();
    println!("{}", view::render_documents(&controller.state().documents, 5));
    Ok(())
}

/// 삭제 명령어 (delete)
async fn cmd_delete(mut controller: Controller, id: &str) -> Result<()> {
    controller.delete_document(id).await;
    report_status(controller.state().status.as_ref())?;

    println!();
    println!("{}", view::render_documents(&controller.state().documents, 5));
    Ok(())
}

/// 질문 명령어 (ask)
async fn cmd_ask(mut controller: Controller, question: &str, rag_only: bool) -> Result<()> {
    println!("[*] 질문 중: \"{}\"\n", question);
    if rag_only {
        controller.ask_rag_only(question).await;
    } else {
        controller.ask_question(question).await;
    }

    let answer = &controller.state().answer;
    println!("{}", view::render_answer(answer));

    if answer.route == RouteLabel::Error {
        bail!("질문 처리 실패");
    }
    Ok(())
}

/// 상태 명령어 (status)
async fn cmd_status(mut controller: Controller, config: &ClientConfig) -> Result<()> {
    println!("rag-compare v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("[*] 설정 파일: {}", default_config_path().display());
    println!("[*] 백엔드: {}", controller.backend().base_url());
    match config.threshold {
        Some(t) => println!("[*] 라우팅 임계값: {:.2}", t),
        None => println!("[*] 라우팅 임계값: 백엔드 기본값"),
    }

    match controller.check_health().await {
        Ok(status) => println!("[OK] 백엔드 상태: {}", status),
        Err(e) => {
            println!("[!] 백엔드 연결 실패: {}", e);
            return Ok(());
        }
    }

    controller.list_documents().await;
    println!("[OK] 저장된 지식: {} 건", controller.state().documents.len());

    Ok(())
}

/// 상태 메시지 출력
///
/// 에러 스타일이면 출력하지 않고 그 메시지로 실패를 반환합니다 (main이 출력).
fn report_status(status: Option<&StatusMessage>) -> Result<()> {
    match status {
        Some(status) if status.is_error() => bail!("{}", status.text),
        Some(status) => {
            println!("{}", view::render_status(status));
            Ok(())
        }
        None => Ok(()),
    }
}

// ============================================================================
// Tests
// ============================================================================
