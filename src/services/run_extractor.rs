//! 段落/Run 提取服务 - 业务能力层
//!
//! 把 `word/document.xml` 流式解析成段落列表，每个段落由带格式标记的 Run 组成。
//! 只关心 `w:p` / `w:r` / `w:t` / `w:tab` / `w:rPr`，其余元素一律跳过。

use crate::error::{ExtractError, ExtractResult};
use crate::models::Paragraph;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

// ========== 格式判断谓词 ==========

/// `w:highlight`：有值且不为 `none`
pub fn is_highlight_on(val: Option<&str>) -> bool {
    val.is_some_and(|v| !v.eq_ignore_ascii_case("none"))
}

/// `w:shd`：填充色既不是 `auto` 也不是白色时视为高亮
pub fn is_shading_on(fill: Option<&str>) -> bool {
    match fill {
        Some(fill) => {
            let fill = fill.trim();
            !(fill.is_empty()
                || fill.eq_ignore_ascii_case("auto")
                || fill.eq_ignore_ascii_case("FFFFFF")
                || fill.eq_ignore_ascii_case("white"))
        }
        None => false,
    }
}

/// `w:u`：没有 `w:val` 或值不为 `none`
pub fn is_underline_on(val: Option<&str>) -> bool {
    val.map_or(true, |v| !v.eq_ignore_ascii_case("none"))
}

/// `w:b`：没有 `w:val` 或值不是关闭标记
pub fn is_bold_on(val: Option<&str>) -> bool {
    val.map_or(true, |v| !(v.eq_ignore_ascii_case("false") || v == "0"))
}

/// 按名称读取属性值
fn get_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

// ========== 流式遍历状态 ==========

/// 正在累积的 Run
#[derive(Debug, Default)]
struct PendingRun {
    text: String,
    highlighted: bool,
    underlined: bool,
    bold: bool,
}

#[derive(Debug, Default)]
struct WalkState {
    paragraphs: Vec<Paragraph>,
    paragraph: Option<Paragraph>,
    /// 嵌套 `w:p`（如文本框）并入最外层段落
    paragraph_depth: usize,
    run: Option<PendingRun>,
    in_run_props: bool,
    in_text: bool,
}

impl WalkState {
    fn handle_start(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"w:p" => {
                if self.paragraph_depth == 0 {
                    self.paragraph = Some(Paragraph::default());
                }
                self.paragraph_depth += 1;
            }
            b"w:r" if self.paragraph.is_some() && self.run.is_none() => {
                self.run = Some(PendingRun::default());
            }
            b"w:rPr" if self.run.is_some() => self.in_run_props = true,
            b"w:t" if self.run.is_some() && !self.in_run_props => self.in_text = true,
            _ => self.handle_property(e),
        }
    }

    fn handle_empty(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"w:tab" if !self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\t');
                }
            }
            // 软换行（Shift+Enter）
            b"w:br" | b"w:cr" if !self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\n');
                }
            }
            _ => self.handle_property(e),
        }
    }

    /// `w:rPr` 内的格式元素
    fn handle_property(&mut self, e: &BytesStart<'_>) {
        if !self.in_run_props {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };
        match e.name().as_ref() {
            b"w:highlight" => {
                run.highlighted |= is_highlight_on(get_attr(e, b"w:val").as_deref());
            }
            b"w:shd" => {
                run.highlighted |= is_shading_on(get_attr(e, b"w:fill").as_deref());
            }
            b"w:u" => run.underlined = is_underline_on(get_attr(e, b"w:val").as_deref()),
            b"w:b" => run.bold = is_bold_on(get_attr(e, b"w:val").as_deref()),
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if !self.in_text {
            return;
        }
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:r" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.push_run(&run.text, run.highlighted, run.underlined, run.bold);
                }
                self.in_text = false;
                self.in_run_props = false;
            }
            b"w:p" => {
                self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
                if self.paragraph_depth == 0 {
                    if let Some(paragraph) = self.paragraph.take() {
                        self.paragraphs.push(paragraph);
                    }
                }
            }
            _ => {}
        }
    }
}

/// 从正文 XML 中提取段落
///
/// # 参数
/// - `xml`: `word/document.xml` 的文本
///
/// # 返回
/// 按文档顺序排列的段落（包括空段落，由调用方过滤）
pub fn extract_paragraphs(xml: &str) -> ExtractResult<Vec<Paragraph>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut state = WalkState::default();
    let mut depth: usize = 0;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                state.handle_start(&e);
            }
            Ok(Event::Empty(e)) => state.handle_empty(&e),
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractError::malformed(position, err.to_string()))?;
                state.handle_text(&text);
            }
            Ok(Event::CData(e)) => {
                state.handle_text(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                state.handle_end(e.name().as_ref());
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ExtractError::malformed(position, err.to_string())),
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ExtractError::malformed(
            reader.buffer_position() as u64,
            format!("文档意外结束，仍有 {} 个元素未闭合", depth),
        ));
    }

    debug!("提取到 {} 个段落", state.paragraphs.len());
    Ok(state.paragraphs)
}
