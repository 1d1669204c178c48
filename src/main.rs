use anyhow::Result;
use clap::Parser;
use youtube_transcript_eval::cli::Cli;
use youtube_transcript_eval::utils::logging;
use youtube_transcript_eval::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config, cli.run_config())?;
    app.run(&cli.testplan_path).await?;

    Ok(())
}
