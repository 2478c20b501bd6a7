use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use xhs_tools::error::{report, AppError};
use xhs_tools::utils::{init_logging, LogTarget};
use xhs_tools::{ChromeLauncher, PublishApp, PublishConfig, PublishRequest};

/// 小红书图文发布工具
///
/// 首次运行需要扫码登录，之后复用会话目录中保存的登录状态。
#[derive(Parser, Debug)]
#[command(name = "xhs-publish", version)]
#[command(after_help = r#"Examples:
  xhs-publish -i photo.png -t "冬日氛围感" -c "温暖的光影" --tags "aigc,写真,光影"
  xhs-publish -i img1.png -i img2.png -t "旅行日记" --dry-run"#)]
struct Cli {
    /// 图片路径（必填，可重复指定多张）
    #[arg(short = 'i', long = "image", value_name = "PATH")]
    images: Vec<PathBuf>,

    /// 标题（最多 20 字）
    #[arg(short, long)]
    title: Option<String>,

    /// 正文（最多 1000 字）
    #[arg(short, long)]
    content: Option<String>,

    /// 逗号分隔的话题，如 "aigc,氛围感写真,光影写真"
    #[arg(long, value_name = "T1,T2,...")]
    tags: Option<String>,

    /// 只填写内容，不点击发布
    #[arg(long)]
    dry_run: bool,

    /// TOML 配置文件，覆盖默认的地址和等待时间
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_request(self) -> PublishRequest {
        let mut request = PublishRequest::new(self.images).with_dry_run(self.dry_run);
        if let Some(title) = self.title {
            request = request.with_title(title);
        }
        if let Some(content) = self.content {
            request = request.with_content(content);
        }
        if let Some(tags) = self.tags.as_deref() {
            request = request.with_tags_csv(tags);
        }
        request
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return parse_error_exit(e),
    };

    init_logging("info", cli.verbose, LogTarget::Stdout);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", report(e.as_ref()));
            let code = e.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = PublishConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    let request = cli.into_request();

    let app = PublishApp::new(config, ChromeLauncher);
    app.run(request).await?;
    Ok(())
}

/// `--help`/`--version` 正常退出，其余参数错误退出码为 1
fn parse_error_exit(e: clap::Error) -> ExitCode {
    let _ = e.print();
    if e.use_stderr() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
