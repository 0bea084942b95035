//! 试卷解析流程 - 流程层
//!
//! 核心职责：定义"一份文档"的完整解析流程
//!
//! 流程顺序：
//! 1. 压缩包 → `word/document.xml`
//! 2. XML → 段落 / Run
//! 3. 逐行分类，驱动解析上下文（行内调用选项提取）
//! 4. 大题分组 → `ExamData`

use crate::error::{AppResult, ExtractResult};
use crate::infrastructure::archive_reader::{load_document_xml, read_document_xml};
use crate::models::{ExamData, Paragraph};
use crate::services::run_extractor::extract_paragraphs;
use crate::services::section_grouper::group_sections;
use crate::workflow::line_classifier::{classify, LineKind};
use crate::workflow::parse_ctx::ParseCtx;
use std::path::Path;
use tracing::{debug, info};

/// 没有标题时的默认值
pub const DEFAULT_TITLE: &str = "Untitled exam";

/// 解析选项
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// 指定试卷标题；为空时取正文前的第一行
    pub title: Option<String>,
    /// 文档中也找不到标题时使用（通常是文件名）
    pub fallback_title: Option<String>,
}

impl ParseOptions {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_fallback_title(title: impl Into<String>) -> Self {
        Self {
            fallback_title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// 从段落列表解析试卷
///
/// 空段落会被跳过。这一步不会失败：结构上的缺陷交给 `services::validator`。
pub fn parse_paragraphs(paragraphs: &[Paragraph], options: &ParseOptions) -> ExamData {
    let mut ctx = ParseCtx::new();

    for paragraph in paragraphs.iter().filter(|p| !p.is_blank()) {
        let line = paragraph.text.trim();
        let kind = classify(
            line,
            ctx.in_reading_passage,
            ctx.current_question.is_some(),
        );
        debug!("{:?} <= {}", kind, line);

        match kind {
            LineKind::SectionHeader(info) => ctx.on_section(info),
            LineKind::PartHeader => ctx.on_part(line),
            LineKind::PassageStart => ctx.on_passage_start(line),
            LineKind::PassageLine => ctx.on_passage_line(line),
            LineKind::QuestionStart { number, rest } => ctx.start_question(number, rest, paragraph),
            LineKind::OptionLine => ctx.on_option_line(paragraph),
            LineKind::AnswerLine(value) => ctx.on_answer_line(value),
            LineKind::Continuation => ctx.on_continuation(line),
            LineKind::Unclassified => ctx.on_unclassified(line),
        }
    }

    let outcome = ctx.finish();
    let sections = group_sections(&outcome.questions);
    let title = options
        .title
        .clone()
        .or(outcome.title)
        .or_else(|| options.fallback_title.clone())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    info!(
        "✓ 解析完成: {} | {} 道题, {} 个大题, {} 个答案",
        title,
        outcome.questions.len(),
        sections.len(),
        outcome.answers.len()
    );

    ExamData {
        title,
        time_limit: outcome.time_limit,
        questions: outcome.questions,
        sections,
        answers: outcome.answers,
    }
}

/// 从正文 XML 解析试卷
pub fn parse_document_xml(xml: &str, options: &ParseOptions) -> ExtractResult<ExamData> {
    let paragraphs = extract_paragraphs(xml)?;
    Ok(parse_paragraphs(&paragraphs, options))
}

/// 从 .docx 字节解析试卷
///
/// # 参数
/// - `bytes`: .docx 文件的原始字节
/// - `options`: 解析选项
///
/// # 返回
/// 压缩包或 XML 无法使用时返回错误，不产生部分结果
pub fn parse_exam_bytes(bytes: &[u8], options: &ParseOptions) -> ExtractResult<ExamData> {
    let xml = read_document_xml(bytes)?;
    parse_document_xml(&xml, options)
}

/// 异步读取并解析 .docx 文件
///
/// 文件读取和解压是仅有的挂起点，之后的解析在阻塞线程池中同步完成
pub async fn parse_exam_file(path: &Path, options: ParseOptions) -> AppResult<ExamData> {
    let xml = load_document_xml(path).await?;
    let exam = tokio::task::spawn_blocking(move || parse_document_xml(&xml, &options))
        .await
        .map_err(|e| crate::error::AppError::Other(format!("解析任务执行失败: {}", e)))??;
    Ok(exam)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;

    fn plain(lines: &[&str]) -> Vec<Paragraph> {
        lines.iter().map(|l| Paragraph::plain(l)).collect()
    }

    #[test]
    fn test_highlighted_option_becomes_answer() {
        let mut question_line = Paragraph::default();
        question_line.push_run("Câu 1. Choose the best answer. A. cat ", false, false, false);
        question_line.push_run("B. dog", true, false, false);

        let paragraphs = vec![
            Paragraph::plain("SECTION A. GRAMMAR: 2.0 POINTS"),
            question_line,
            Paragraph::plain("Đáp án: ..."),
        ];
        let exam = parse_paragraphs(&paragraphs, &ParseOptions::default());

        assert_eq!(exam.questions.len(), 1);
        let q = &exam.questions[0];
        assert_eq!(q.number, 1);
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.options.len(), 2);
        assert_eq!((q.options[0].letter, q.options[0].text.as_str()), ('A', "cat"));
        assert_eq!((q.options[1].letter, q.options[1].text.as_str()), ('B', "dog"));
        assert_eq!(q.correct_answer.as_deref(), Some("B"));
        assert_eq!(exam.answers.get(&1).map(String::as_str), Some("B"));
        assert_eq!(exam.sections[0].points.as_deref(), Some("2.0 POINTS"));
    }

    #[test]
    fn test_letters_in_stem_are_not_options() {
        let mut option_line = Paragraph::default();
        option_line.push_run("A. cat\tB. dog\tC. cow\t", false, false, false);
        option_line.push_run("D. pen", true, false, false);

        let paragraphs = vec![
            Paragraph::plain("Câu 1. Which word (A, B, C or D) is different?"),
            option_line,
        ];
        let exam = parse_paragraphs(&paragraphs, &ParseOptions::default());

        let q = &exam.questions[0];
        assert_eq!(q.text, "Which word (A, B, C or D) is different?");
        let letters: Vec<char> = q.options.iter().map(|o| o.letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D']);
        assert_eq!(q.options[3].text, "pen");
        assert_eq!(exam.answers.get(&1).map(String::as_str), Some("D"));
    }

    #[test]
    fn test_options_after_soft_line_breaks() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Câu 1. Pick one.</w:t><w:br/><w:t>A. cat</w:t><w:br/></w:r><w:r><w:rPr><w:highlight w:val="yellow"/></w:rPr><w:t>B. dog</w:t></w:r></w:p></w:body></w:document>"#;
        let exam = parse_document_xml(xml, &ParseOptions::default()).unwrap();

        let q = &exam.questions[0];
        assert_eq!(q.text, "Pick one.");
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.options.len(), 2);
        assert_eq!(q.options[0].text, "cat");
        assert_eq!(q.correct_answer.as_deref(), Some("B"));
    }

    #[test]
    fn test_question_without_options_is_free_response() {
        let exam = parse_paragraphs(
            &plain(&["Câu 5. I wish I ___ taller.", "Câu 6. Next one."]),
            &ParseOptions::default(),
        );

        let q5 = exam.question(5).unwrap();
        assert!(q5.options.is_empty());
        assert_eq!(q5.question_type, QuestionType::FreeResponse);
    }

    #[test]
    fn test_continuation_and_blank_lines() {
        let exam = parse_paragraphs(
            &plain(&["Câu 1. First line", "   ", "second line", "A. yes", "B. no"]),
            &ParseOptions::default(),
        );
        let q = &exam.questions[0];
        assert_eq!(q.text, "First line\nsecond line");
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
    }

    #[test]
    fn test_questions_sorted_by_number() {
        let exam = parse_paragraphs(
            &plain(&["Câu 3. c", "Câu 1. a", "Câu 2. b"]),
            &ParseOptions::default(),
        );
        let numbers: Vec<u32> = exam.questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_passage_block_shared_by_questions() {
        let exam = parse_paragraphs(
            &plain(&[
                "SECTION B. READING: 3.0 POINTS",
                "Read the passage and answer the questions.",
                "Nam is a student.",
                "He lives in Da Nang.",
                "Câu 1. Is Nam a student?",
                "Câu 2. Where does he live?",
            ]),
            &ParseOptions::default(),
        );

        let expected = "Read the passage and answer the questions.\nNam is a student.\nHe lives in Da Nang.";
        assert_eq!(exam.questions[0].passage.as_deref(), Some(expected));
        assert_eq!(exam.questions[1].passage.as_deref(), Some(expected));
        assert_eq!(exam.sections.len(), 1);
        assert_eq!(exam.sections[0].passage.as_deref(), Some(expected));
        // 材料结束后，题干不会再并入材料
        assert_eq!(exam.questions[1].text, "Where does he live?");
    }

    #[test]
    fn test_title_option_overrides_preamble() {
        let paragraphs = plain(&["ĐỀ THI THỬ", "Câu 1. x"]);
        let exam = parse_paragraphs(&paragraphs, &ParseOptions::default());
        assert_eq!(exam.title, "ĐỀ THI THỬ");

        let exam = parse_paragraphs(&paragraphs, &ParseOptions::with_title("Mock test"));
        assert_eq!(exam.title, "Mock test");

        let exam = parse_paragraphs(&[], &ParseOptions::with_fallback_title("de_thi_01"));
        assert_eq!(exam.title, "de_thi_01");

        let exam = parse_paragraphs(&[], &ParseOptions::default());
        assert_eq!(exam.title, DEFAULT_TITLE);
        assert!(exam.questions.is_empty());
    }
}
