//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量文档的调度和统计。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：输出启动信息（日志文件由 `utils::logging::init` 负责）
//! 2. **批量扫描**：扫描输入目录下所有 .docx 文件
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将文档分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有文档的处理结果
//!
//! 每个文档的解析互不共享状态，可以放心并行。

use crate::config::Config;
use crate::orchestrator::document_processor::{self, DocumentOutcome};
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_documents_loaded, log_startup, print_final_stats,
};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    /// 写出且校验通过
    pub success: usize,
    /// 校验未通过（无论是否写出）
    pub invalid: usize,
    /// 解析或写文件失败
    pub failed: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    invalid: usize,
    failed: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(config.max_concurrent_documents);

        Ok(Self { config })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        info!("\n📁 正在扫描待解析的文档...");
        let documents = document_processor::list_documents(&self.config.input_folder).await?;

        if documents.is_empty() {
            warn!("⚠️ 没有找到待解析的 .docx 文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_documents_loaded(documents.len(), self.config.max_concurrent_documents);

        let stats = self.process_all_documents(documents).await?;

        print_final_stats(
            stats.success,
            stats.invalid,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 处理所有文档
    async fn process_all_documents(&self, documents: Vec<PathBuf>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_documents.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = documents.len();
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(total);
            let batch_num = (batch_start / batch_size) + 1;
            let total_batches = total.div_ceil(batch_size);

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

            let batch_result = self
                .process_batch(&documents[batch_start..batch_end], batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.invalid += batch_result.invalid;
            stats.failed += batch_result.failed;

            log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.invalid + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_documents: &[PathBuf],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, path) in batch_documents.iter().enumerate() {
            let doc_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let path = path.clone();
            let config = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = document_processor::process_document(&path, doc_index, &config).await;
                if let Err(e) = &result {
                    error!("[文档 {}] ❌ 处理过程中发生错误: {:#}", doc_index, e);
                }
                result
            });
            batch_handles.push((doc_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for (doc_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(DocumentOutcome::Written { valid: true, .. })) => result.success += 1,
                Ok(Ok(DocumentOutcome::Written { valid: false, .. }))
                | Ok(Ok(DocumentOutcome::SkippedInvalid)) => result.invalid += 1,
                Ok(Err(_)) => result.failed += 1,
                Err(e) => {
                    error!("[文档 {}] 任务执行失败: {}", doc_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}
