//! 警告写入服务 - 业务能力层
//!
//! 只负责"把校验问题写入 warn.txt"，不关心流程

use crate::services::validator::ValidationProblem;
use anyhow::{Context, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 警告写入服务
///
/// 每个问题一行：`文档 <名称> | <问题>`
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 写入一个文档的全部校验问题
    ///
    /// # 参数
    /// - `document`: 文档名称
    /// - `problems`: 校验问题列表，为空时不写入
    pub async fn write(&self, document: &str, problems: &[ValidationProblem]) -> Result<()> {
        if problems.is_empty() {
            return Ok(());
        }

        debug!("写入警告: 文档 {} | 问题数: {}", document, problems.len());

        let warn_msg: String = problems
            .iter()
            .map(|p| format!("文档 {} | {}\n", document, p))
            .collect();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await
            .with_context(|| format!("无法打开警告文件: {}", self.warn_file_path))?;

        file.write_all(warn_msg.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_appends_one_line_per_problem() {
        let path = std::env::temp_dir().join(format!("exam_warn_{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let writer = WarnWriter::with_path(path.to_string_lossy());

        writer
            .write(
                "de_thi.docx",
                &[
                    ValidationProblem::MissingAnswer { number: 3 },
                    ValidationProblem::NoOptions { number: 4 },
                ],
            )
            .await
            .unwrap();
        writer.write("empty.docx", &[]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("文档 de_thi.docx | Câu 3"));

        let _ = std::fs::remove_file(&path);
    }
}
