//! 选项/答案提取服务 - 业务能力层
//!
//! 在一行文本中定位 `A.` / `B)` 形式的选项标记，切分选项内容，
//! 并根据 Run 的高亮标记推断正确选项。

use crate::models::{Paragraph, Question, QuestionOption, QuestionType};
use crate::services::formatting::render_span;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// 选项标记：行首、空白或左括号之后的 A-D，再跟 `.` 或 `)`
static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[\s(])([A-D])[.)]").expect("marker regex"));

static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("spaces regex"));

/// 一行中检测到的选项标记
///
/// 所有偏移均为段落内字节偏移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionMarker {
    pub letter: char,
    /// 标记前缀（空白或左括号）的位置；行首标记与 `start` 相同
    pub prefix_start: usize,
    /// 字母所在位置
    pub start: usize,
    /// 标记结束、内容开始的位置
    pub content_start: usize,
    /// 下一个标记前缀的开始位置，或行尾
    pub end: usize,
}

/// 查找所有不重叠的选项标记（不检查字母顺序）
pub fn find_markers(text: &str) -> Vec<OptionMarker> {
    let markers = MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let letter = caps.get(1)?;
            Some(OptionMarker {
                letter: letter.as_str().chars().next()?,
                prefix_start: whole.start(),
                start: letter.start(),
                content_start: whole.end(),
                end: text.len(),
            })
        })
        .collect();
    link_ends(markers, text.len())
}

/// 按字母顺序筛选标记
///
/// 第一个标记必须是题目还缺的最小字母，之后的标记字母必须递增且尚未出现；
/// 跳过的字母如果在行内稍后出现，当前标记不算。
/// 不合顺序的标记（如题干里的 `(A, B, C or D)`）并入前一个选项的内容。
///
/// # 参数
/// - `text`: 一行文本
/// - `existing`: 题目已有的选项字母
pub fn select_markers(text: &str, existing: &[char]) -> Vec<OptionMarker> {
    let first_missing = ('A'..='D').find(|c| !existing.contains(c));
    let markers = find_markers(text);
    let mut selected: Vec<OptionMarker> = Vec::new();

    for (i, marker) in markers.iter().enumerate() {
        let accepted = match selected.last() {
            None => Some(marker.letter) == first_missing,
            Some(prev) => {
                marker.letter > prev.letter
                    && !existing.contains(&marker.letter)
                    && !markers[i + 1..]
                        .iter()
                        .any(|later| later.letter > prev.letter && later.letter < marker.letter)
            }
        };
        if accepted {
            selected.push(*marker);
        } else {
            debug!("跳过不合顺序的选项标记 {} @ {}", marker.letter, marker.start);
        }
    }

    link_ends(selected, text.len())
}

fn link_ends(mut markers: Vec<OptionMarker>, text_len: usize) -> Vec<OptionMarker> {
    for i in 1..markers.len() {
        markers[i - 1].end = markers[i].prefix_start;
    }
    if let Some(last) = markers.last_mut() {
        last.end = text_len;
    }
    markers
}

/// 第一个选项标记的位置（用于把题干和行内选项分开）
pub fn first_marker_start(text: &str) -> Option<usize> {
    select_markers(text, &[]).first().map(|m| m.start)
}

/// 折叠连续空白（含换行）并去掉首尾空白
pub fn normalize_whitespace(text: &str) -> String {
    SPACES_RE.replace_all(text, " ").trim().to_string()
}

/// 从段落中提取选项，追加到当前题目
///
/// # 参数
/// - `paragraph`: 当前行所在的段落（文本 + Run）
/// - `question`: 正在构建的题目
///
/// # 返回
/// 本次新增的选项数量。已存在的字母和空内容会被跳过，
/// 因此对同一行重复调用不会产生重复选项。
pub fn extract_options(paragraph: &Paragraph, question: &mut Question) -> usize {
    let text = paragraph.text.as_str();
    let existing: Vec<char> = question.options.iter().map(|o| o.letter).collect();
    let mut added = 0;

    for marker in select_markers(text, &existing) {
        let raw = &text[marker.content_start..marker.end];
        let content = normalize_whitespace(raw);
        if content.is_empty() {
            continue;
        }

        // 选项区间不含尾部空白，否则下一个选项前的高亮空白会算到本选项
        let lead = raw.len() - raw.trim_start().len();
        let trail = raw.len() - raw.trim_end().len();
        let body_end = marker.end - trail;

        let is_correct = paragraph
            .runs
            .iter()
            .any(|r| r.highlighted && r.overlaps(marker.start, body_end));

        let rendered = render_span(
            text,
            &paragraph.runs,
            marker.content_start + lead,
            body_end,
        );

        debug!(
            "题目 {} 选项 {}: {}{}",
            question.number,
            marker.letter,
            content,
            if is_correct { " (高亮)" } else { "" }
        );

        question.options.push(QuestionOption {
            letter: marker.letter,
            text: content,
            formatted_text: rendered.has_formatting.then_some(rendered.markup),
            is_correct,
        });
        added += 1;
    }

    if question.options.len() >= 2 && question.question_type != QuestionType::FreeResponse {
        question.question_type = QuestionType::MultipleChoice;
    }
    question.options.sort_by_key(|o| o.letter);

    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_line() -> Paragraph {
        let mut p = Paragraph::default();
        p.push_run("Câu 1. Choose the best answer. A. cat ", false, false, false);
        p.push_run("B. dog", true, false, false);
        p
    }

    #[test]
    fn test_find_markers() {
        let markers = find_markers("A. cat\tB) dog (C) bird D.fish");
        let letters: Vec<char> = markers.iter().map(|m| m.letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D']);
        assert_eq!(markers[0].start, 0);
        assert_eq!(markers[0].end, markers[1].prefix_start);
        assert_eq!(markers[1].prefix_start + 1, markers[1].start);
        assert_eq!(markers[3].end, "A. cat\tB) dog (C) bird D.fish".len());
    }

    #[test]
    fn test_ignores_letters_inside_words() {
        assert!(find_markers("Câu 1. Choose the best answer.").is_empty());
        assert!(find_markers("I wish I ___ taller.").is_empty());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace(" \t big \t\t cat  "), "big cat");
    }

    #[test]
    fn test_extracts_inline_options_and_highlight() {
        let mut q = Question::new(1, "Choose the best answer.");
        let added = extract_options(&scenario_line(), &mut q);

        assert_eq!(added, 2);
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.options[0].text, "cat");
        assert!(!q.options[0].is_correct);
        assert_eq!(q.options[1].text, "dog");
        assert!(q.options[1].is_correct);
        assert!(q.options.iter().all(|o| o.formatted_text.is_none()));
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let mut q = Question::new(1, "");
        let line = scenario_line();
        extract_options(&line, &mut q);
        let added = extract_options(&line, &mut q);

        assert_eq!(added, 0);
        assert_eq!(q.options.len(), 2);
    }

    #[test]
    fn test_two_column_layout_is_sorted() {
        let mut q = Question::new(2, "");
        extract_options(&Paragraph::plain("A. first\tC. third"), &mut q);
        extract_options(&Paragraph::plain("B. second\tD. fourth"), &mut q);

        let letters: Vec<char> = q.options.iter().map(|o| o.letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D']);
        assert_eq!(q.options[1].text, "second");
    }

    #[test]
    fn test_select_markers_skips_out_of_sequence_letters() {
        let stem = "Which word (A, B, C or D) is different?";
        assert!(select_markers(stem, &[]).is_empty());
        assert_eq!(first_marker_start(stem), None);

        let markers = select_markers("Pick (D) one. A. x B. y", &[]);
        let letters: Vec<char> = markers.iter().map(|m| m.letter).collect();
        assert_eq!(letters, vec!['A', 'B']);

        // 已有 A、B 时，从 C 开始
        let markers = select_markers("A. again C. cow D. hen", &['A', 'B']);
        let letters: Vec<char> = markers.iter().map(|m| m.letter).collect();
        assert_eq!(letters, vec!['C', 'D']);
    }

    #[test]
    fn test_stray_marker_merges_into_previous_option() {
        let mut q = Question::new(6, "");
        extract_options(&Paragraph::plain("A. Plan B. ask (D) later\tC. wait"), &mut q);

        let letters: Vec<char> = q.options.iter().map(|o| o.letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'C']);
        assert_eq!(q.options[1].text, "ask (D) later");
    }

    #[test]
    fn test_highlighted_leading_tab_marks_only_its_option() {
        let mut p = Paragraph::default();
        p.push_run("Câu 1. Choose the best answer. A. cat", false, false, false);
        p.push_run("\tB. dog", true, false, false);
        p.push_run("\tC. cow\tD. hen", false, false, false);

        let mut q = Question::new(1, "Choose the best answer.");
        extract_options(&p, &mut q);

        let correct: Vec<char> = q
            .options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.letter)
            .collect();
        assert_eq!(correct, vec!['B']);
        assert_eq!(q.inferred_correct().map(|o| o.letter), Some('B'));
    }

    #[test]
    fn test_options_split_by_line_breaks() {
        let mut q = Question::new(7, "Pick one.");
        extract_options(&Paragraph::plain("Pick one.\nA. cat\nB. big\n  dog"), &mut q);

        assert_eq!(q.options.len(), 2);
        assert_eq!(q.options[0].text, "cat");
        assert_eq!(q.options[1].text, "big dog");
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
    }

    #[test]
    fn test_empty_option_content_is_skipped() {
        let mut q = Question::new(3, "");
        extract_options(&Paragraph::plain("A.   B. real"), &mut q);
        assert_eq!(q.options.len(), 1);
        assert_eq!(q.options[0].letter, 'B');
        assert_eq!(q.question_type, QuestionType::Undetermined);
    }

    #[test]
    fn test_free_response_type_is_kept() {
        let mut q = Question::new(4, "");
        q.question_type = QuestionType::FreeResponse;
        extract_options(&Paragraph::plain("A. one B. two"), &mut q);
        assert_eq!(q.question_type, QuestionType::FreeResponse);
    }

    #[test]
    fn test_underlined_option_gets_formatted_text() {
        let mut p = Paragraph::default();
        p.push_run("A. ", false, false, false);
        p.push_run("th", false, true, false);
        p.push_run("ink   ", false, false, false);
        p.push_run("B. ", false, false, false);
        p.push_run("wh", false, true, false);
        p.push_run("at", false, false, false);

        let mut q = Question::new(5, "");
        extract_options(&p, &mut q);

        assert_eq!(q.options[0].text, "think");
        assert_eq!(
            q.options[0].formatted_text.as_deref(),
            Some("<span class=\"underline\">th</span>ink")
        );
        assert_eq!(
            q.options[1].formatted_text.as_deref(),
            Some("<span class=\"underline\">wh</span>at")
        );
    }
}
