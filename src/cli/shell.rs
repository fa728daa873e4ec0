//! 대화형 셸 - 한 세션 동안 하나의 컨트롤러 상태를 유지

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};

use crate::api::{HttpBackend, KnowledgeType};
use crate::controller::{KnowledgeForm, UiController};
use crate::view;

const HELP: &str = "\
명령어:
  list              저장된 지식 목록
  store [텍스트]    지식 저장 (엔티티/슬롯/유형은 순서대로 입력)
  delete <ID>       지식 삭제
  ask <질문>        질문 (RAG/LLM 라우팅)
  rag <질문>        라우팅 없이 RAG로만 질문
  help              도움말
  quit | exit       종료";

/// 셸 입력 한 줄
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    List,
    Store(Option<String>),
    Delete(String),
    Ask(String),
    AskRagOnly(String),
    Help,
    Quit,
    Invalid(String),
}

/// 셸 입력 파싱
pub fn parse_shell_line(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "list" | "ls" => ShellCommand::List,
        "store" | "add" => {
            if rest.is_empty() {
                ShellCommand::Store(None)
            } else {
                ShellCommand::Store(Some(rest.to_string()))
            }
        }
        "delete" | "rm" => {
            if rest.is_empty() {
                ShellCommand::Invalid("삭제할 문서 ID를 입력해주세요.".to_string())
            } else {
                ShellCommand::Delete(rest.to_string())
            }
        }
        "ask" | "q" => ShellCommand::Ask(rest.to_string()),
        "rag" => ShellCommand::AskRagOnly(rest.to_string()),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("알 수 없는 명령어: {}", other)),
    }
}

async fn prompt<R>(lines: &mut Lines<R>, label: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await.context("입력 읽기 실패")
}

/// 폼 필드를 순서대로 입력받음 (EOF면 None)
///
/// 텍스트가 비어 있으면 나머지 필드를 묻지 않고 바로 반환합니다.
async fn read_form<R>(lines: &mut Lines<R>, text: Option<String>) -> Result<Option<KnowledgeForm>>
where
    R: AsyncBufRead + Unpin,
{
    let text = match text {
        Some(t) => t,
        None => match prompt(lines, "  텍스트: ").await? {
            Some(t) => t,
            None => return Ok(None),
        },
    };

    if text.trim().is_empty() {
        return Ok(Some(KnowledgeForm {
            text,
            ..KnowledgeForm::default()
        }));
    }

    let Some(entity) = prompt(lines, "  엔티티 (선택): ").await? else {
        return Ok(None);
    };
    let Some(slot) = prompt(lines, "  슬롯 (선택): ").await? else {
        return Ok(None);
    };
    let Some(raw_kind) = prompt(lines, "  유형 [fact/history/summary] (기본 fact): ").await?
    else {
        return Ok(None);
    };

    let kind = if raw_kind.trim().is_empty() {
        KnowledgeType::default()
    } else {
        match raw_kind.parse::<KnowledgeType>() {
            Ok(kind) => kind,
            Err(e) => {
                println!("[!] {}", e);
                KnowledgeType::default()
            }
        }
    };

    Ok(Some(KnowledgeForm {
        text,
        entity,
        slot,
        kind,
    }))
}

/// 대화형 셸 실행
pub(super) async fn run_shell(mut controller: UiController<HttpBackend>) -> Result<()> {
    println!("rag-compare shell ({})", controller.backend().base_url());
    println!("{}\n", HELP);

    controller.list_documents().await;
    println!("{}\n", view::render_documents(&controller.state().documents, 20));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(line) = prompt(&mut lines, "rag> ").await? else {
            break;
        };

        match parse_shell_line(&line) {
            ShellCommand::Empty => continue,
            ShellCommand::List => {
                controller.list_documents().await;
                println!("{}", view::render_documents(&controller.state().documents, 50));
            }
            ShellCommand::Store(text) => {
                let Some(form) = read_form(&mut lines, text).await? else {
                    break;
                };
                controller.set_form(form);
                controller.store_document().await;
                print_status(&mut controller);
            }
            ShellCommand::Delete(id) => {
                controller.delete_document(&id).await;
                print_status(&mut controller);
            }
            ShellCommand::Ask(question) => {
                controller.ask_question(&question).await;
                println!("{}", view::render_answer(&controller.state().answer));
            }
            ShellCommand::AskRagOnly(question) => {
                controller.ask_rag_only(&question).await;
                println!("{}", view::render_answer(&controller.state().answer));
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => break,
            ShellCommand::Invalid(message) => {
                println!("[!] {}", message);
                println!("{}", HELP);
            }
        }
        println!();
    }

    Ok(())
}

fn print_status(controller: &mut UiController<HttpBackend>) {
    if let Some(status) = &controller.state().status {
        println!("{}", view::render_status(status));
    }
    controller.clear_status();
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_shell_line(""), ShellCommand::Empty);
        assert_eq!(parse_shell_line("  list "), ShellCommand::List);
        assert_eq!(parse_shell_line("LS"), ShellCommand::List);
        assert_eq!(parse_shell_line("help"), ShellCommand::Help);
        assert_eq!(parse_shell_line("exit"), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_store() {
        assert_eq!(parse_shell_line("store"), ShellCommand::Store(None));
        assert_eq!(
            parse_shell_line("store 부산은 항구 도시다"),
            ShellCommand::Store(Some("부산은 항구 도시다".to_string()))
        );
    }

    #[test]
    fn test_parse_delete_requires_id() {
        assert_eq!(
            parse_shell_line("delete 65a1f0"),
            ShellCommand::Delete("65a1f0".to_string())
        );
        assert!(matches!(parse_shell_line("delete  "), ShellCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_ask_keeps_blank_for_validation() {
        assert_eq!(
            parse_shell_line("ask 한국의 수도는?"),
            ShellCommand::Ask("한국의 수도는?".to_string())
        );
        assert_eq!(parse_shell_line("ask"), ShellCommand::Ask(String::new()));
    }

    #[test]
    fn test_parse_rag_only() {
        assert_eq!(
            parse_shell_line("rag 한국의 수도는?"),
            ShellCommand::AskRagOnly("한국의 수도는?".to_string())
        );
    }

    #[tokio::test]
    async fn test_blank_text_skips_metadata_prompts() {
        let input: &[u8] = b"   \nnext-command\n";
        let mut lines = BufReader::new(input).lines();

        let form = read_form(&mut lines, None)
            .await
            .expect("read failed")
            .expect("form missing");

        assert!(form.text.trim().is_empty());
        assert_eq!(form.entity, "");
        assert_eq!(form.kind, KnowledgeType::default());
        // 남은 입력은 소비되지 않아야 함
        let next = lines.next_line().await.expect("read failed");
        assert_eq!(next.as_deref(), Some("next-command"));
    }

    #[tokio::test]
    async fn test_read_form_collects_all_fields() {
        let input: &[u8] = "서울\nseoul\n\nhistory\n".as_bytes();
        let mut lines = BufReader::new(input).lines();

        let form = read_form(&mut lines, None)
            .await
            .expect("read failed")
            .expect("form missing");

        assert_eq!(form.text, "서울");
        assert_eq!(form.entity, "seoul");
        assert_eq!(form.slot, "");
        assert_eq!(form.kind, KnowledgeType::History);
    }

    #[tokio::test]
    async fn test_read_form_eof_mid_form() {
        let input: &[u8] = b"text only\n";
        let mut lines = BufReader::new(input).lines();

        let form = read_form(&mut lines, None).await.expect("read failed");
        assert!(form.is_none());
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(parse_shell_line("frobnicate"), ShellCommand::Invalid(_)));
    }
}
