//! 压缩包读取 - 基础设施层
//!
//! 只负责"从 .docx 压缩包中取出正文 XML"，不认识段落和题目

use crate::error::{AppError, AppResult, ExtractError, ExtractResult};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// 正文 XML 在压缩包中的固定路径
pub const DOCUMENT_ENTRY: &str = "word/document.xml";

/// 正文 XML 的解压上限
pub const MAX_DOCUMENT_XML_BYTES: u64 = 256 * 1024 * 1024;

/// 预分配上限，声明的大小只作为提示
const PREALLOC_LIMIT: u64 = 4 * 1024 * 1024;

/// 从压缩包字节中读取正文 XML
///
/// # 参数
/// - `bytes`: .docx 文件的原始字节
///
/// # 返回
/// 返回 `word/document.xml` 的文本内容
pub fn read_document_xml(bytes: &[u8]) -> ExtractResult<String> {
    read_document_xml_limited(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn read_document_xml_limited(bytes: &[u8], limit: u64) -> ExtractResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let entry = archive.by_name(DOCUMENT_ENTRY).map_err(|e| match e {
        ZipError::FileNotFound => ExtractError::MissingEntry {
            entry: DOCUMENT_ENTRY.to_string(),
        },
        other => ExtractError::from(other),
    })?;

    let declared = entry.size();
    if declared > limit {
        return Err(ExtractError::ArchiveFormat(format!(
            "{} 声明大小 {} 字节，超过上限 {}",
            DOCUMENT_ENTRY, declared, limit
        )));
    }

    // 实际解压量也要限制，头部声明的大小不可信
    let mut buf = Vec::with_capacity(declared.min(PREALLOC_LIMIT) as usize);
    entry
        .take(limit + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ExtractError::ArchiveFormat(format!("无法解压 {}: {}", DOCUMENT_ENTRY, e)))?;
    if buf.len() as u64 > limit {
        return Err(ExtractError::ArchiveFormat(format!(
            "{} 解压后超过上限 {} 字节",
            DOCUMENT_ENTRY, limit
        )));
    }

    let xml = String::from_utf8(buf)
        .map_err(|e| ExtractError::ArchiveFormat(format!("{} 不是 UTF-8: {}", DOCUMENT_ENTRY, e)))?;

    debug!("读取 {} 完成，长度: {}", DOCUMENT_ENTRY, xml.len());
    Ok(xml)
}

/// 异步读取 .docx 文件并取出正文 XML
///
/// 文件读取走 tokio::fs，解压放到阻塞线程池
pub async fn load_document_xml(path: &Path) -> AppResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let xml = tokio::task::spawn_blocking(move || read_document_xml(&bytes))
        .await
        .map_err(|e| AppError::Other(format!("解压任务执行失败: {}", e)))??;

    Ok(xml)
}
