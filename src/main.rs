use anyhow::Result;
use exam_docx_extract::utils::logging;
use exam_docx_extract::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志（终端 + 日志文件）
    logging::init(config.verbose_logging, Some(&config.output_log_file))?;

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;

    if stats.failed > 0 {
        anyhow::bail!("{} 个文档解析失败", stats.failed);
    }

    Ok(())
}
