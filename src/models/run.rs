use serde::{Deserialize, Serialize};

/// 段落内格式一致的一段文本
///
/// `start`/`end` 是段落拼接文本中的字节偏移，左闭右开。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub highlighted: bool,
    pub underlined: bool,
    pub bold: bool,
}

impl Run {
    /// 与 `[start, end)` 区间是否相交
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}

/// 段落：有序的 Run 列表 + 拼接后的完整文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// 按顺序追加一个 Run，偏移量自动累加；空文本的 Run 被丢弃
    pub fn push_run(&mut self, text: &str, highlighted: bool, underlined: bool, bold: bool) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        self.runs.push(Run {
            text: text.to_string(),
            start,
            end: self.text.len(),
            highlighted,
            underlined,
            bold,
        });
    }

    /// 由纯文本构造一个无格式段落
    pub fn plain(text: &str) -> Self {
        let mut paragraph = Self::default();
        paragraph.push_run(text, false, false, false);
        paragraph
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
