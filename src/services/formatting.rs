//! 格式化文本渲染
//!
//! 把段落中一段偏移区间按 Run 的下划线/加粗标记渲染成内联标记，
//! 供语音题等依赖下划线位置的选项使用。

use crate::models::Run;

/// 下划线使用的样式类名
pub const UNDERLINE_CLASS: &str = "underline";

/// 转义纯文本，使其可以安全嵌入标记中
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 按格式标记包裹一段已转义的文本
fn wrap(escaped: &str, underlined: bool, bold: bool) -> String {
    match (underlined, bold) {
        (true, true) => format!(
            "<strong><span class=\"{}\">{}</span></strong>",
            UNDERLINE_CLASS, escaped
        ),
        (true, false) => format!("<span class=\"{}\">{}</span>", UNDERLINE_CLASS, escaped),
        (false, true) => format!("<strong>{}</strong>", escaped),
        (false, false) => escaped.to_string(),
    }
}

/// 渲染结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSpan {
    pub markup: String,
    /// 区间内是否存在下划线或加粗
    pub has_formatting: bool,
}

/// 渲染段落文本 `text` 的 `[start, end)` 区间
///
/// # 参数
/// - `text`: 段落拼接文本
/// - `runs`: 段落的 Run 列表（有序、不重叠）
/// - `start`/`end`: 字节偏移，左闭右开
///
/// # 返回
/// 去掉标记并反转义后，结果与 `text[start..end]` 相同
pub fn render_span(text: &str, runs: &[Run], start: usize, end: usize) -> FormattedSpan {
    let mut markup = String::new();
    let mut has_formatting = false;
    let mut cursor = start;

    for run in runs.iter().filter(|r| r.overlaps(start, end)) {
        let from = run.start.max(start);
        let to = run.end.min(end);

        // Run 之间的空隙按无格式文本输出
        if from > cursor {
            markup.push_str(&escape_text(&text[cursor..from]));
        }

        let piece = escape_text(&text[from..to]);
        if run.underlined || run.bold {
            has_formatting = true;
        }
        markup.push_str(&wrap(&piece, run.underlined, run.bold));
        cursor = to;
    }

    if cursor < end {
        markup.push_str(&escape_text(&text[cursor..end]));
    }

    FormattedSpan {
        markup,
        has_formatting,
    }
}
