//! 单个文档处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **解析**：委托 `workflow::exam_flow` 把 .docx 解析成 `ExamData`
//! 2. **校验**：调用 `services::validator`，问题写入 warn.txt
//! 3. **输出**：把试卷写成 JSON 文件
//! 4. **统计输出**：记录题目数、答案数、校验结果

use crate::config::Config;
use crate::models::ExamData;
use crate::services::{validate, WarnWriter};
use crate::utils::truncate_text;
use crate::workflow::{parse_exam_file, ParseOptions};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// 单个文档的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// 已写出 JSON；`valid` 为校验结果
    Written { output: PathBuf, valid: bool },
    /// 校验未通过且配置为跳过
    SkippedInvalid,
}

/// 扫描目录下所有 .docx 文件（忽略 Word 的 `~$` 临时文件），按文件名排序
pub async fn list_documents(folder_path: &str) -> Result<Vec<PathBuf>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut documents = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_docx = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        let is_lock_file = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.starts_with("~$"));
        if is_docx && !is_lock_file {
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}

/// 处理单个文档
///
/// # 参数
/// - `path`: .docx 文件路径
/// - `doc_index`: 文档索引（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 压缩包/XML 错误和写文件失败会返回 Err；结构问题只记入 warn.txt
pub async fn process_document(
    path: &Path,
    doc_index: usize,
    config: &Config,
) -> Result<DocumentOutcome> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("document_{}", doc_index));
    let display_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| stem.clone());

    info!("[文档 {}] 开始解析: {}", doc_index, display_name);

    let exam = parse_exam_file(path, ParseOptions::with_fallback_title(stem.clone()))
        .await
        .with_context(|| format!("解析失败: {}", path.display()))?;

    log_exam_summary(doc_index, &exam, config.verbose_logging);

    let report = validate(&exam);
    if !report.valid {
        for problem in &report.problems {
            warn!("[文档 {}] ⚠️ {}", doc_index, problem);
        }
        WarnWriter::with_path(&config.warn_file)
            .write(&display_name, &report.problems)
            .await?;

        if config.skip_invalid {
            warn!("[文档 {}] ⚠️ 校验未通过，跳过输出", doc_index);
            return Ok(DocumentOutcome::SkippedInvalid);
        }
    }

    let output = write_exam_json(&exam, &config.output_folder, &stem).await?;
    info!("[文档 {}] ✅ 已写出: {}", doc_index, output.display());

    Ok(DocumentOutcome::Written {
        output,
        valid: report.valid,
    })
}

/// 把试卷写成 `<output_folder>/<stem>.json`
pub async fn write_exam_json(exam: &ExamData, output_folder: &str, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_folder)
        .await
        .with_context(|| format!("无法创建输出目录: {}", output_folder))?;

    let output = Path::new(output_folder).join(format!("{}.json", stem));
    let json = serde_json::to_string_pretty(exam)?;
    fs::write(&output, json)
        .await
        .with_context(|| format!("无法写入文件: {}", output.display()))?;

    Ok(output)
}

// ========== 日志辅助函数 ==========

fn log_exam_summary(doc_index: usize, exam: &ExamData, verbose: bool) {
    info!("[文档 {}] 标题: {}", doc_index, exam.title);
    if let Some(minutes) = exam.time_limit {
        info!("[文档 {}] 考试时长: {} 分钟", doc_index, minutes);
    }
    info!(
        "[文档 {}] 题目: {} | 大题: {} | 答案: {}",
        doc_index,
        exam.questions.len(),
        exam.sections.len(),
        exam.answers.len()
    );

    if verbose {
        for question in &exam.questions {
            info!(
                "[文档 {}]   Câu {} ({:?}): {}",
                doc_index,
                question.number,
                question.question_type,
                truncate_text(&question.text, 60)
            );
        }
    }
}
