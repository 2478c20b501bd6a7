use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use xhs_tools::error::{report, AppError};
use xhs_tools::utils::{init_logging, LogTarget};
use xhs_tools::{
    ErrorKind, OutputMode, SearchApp, SearchConfig, SearchKind, SearchRequest, SerperClient,
    TimeRange,
};

/// Serper Search CLI - Google Search via serper.dev API
///
/// Requires the SERPER_API_KEY environment variable.
#[derive(Parser, Debug)]
#[command(name = "serper-search", version)]
#[command(after_help = r#"Examples:
  serper-search "Rust async best practices"
  serper-search "AI news" -t news -n 5
  serper-search "sunset" -t images -n 3
  serper-search "tech" -t news --tbs qdr:w
  serper-search "python" -j"#)]
struct Cli {
    /// Search query
    query: Option<String>,

    /// Search type
    #[arg(short = 't', long = "type", value_enum, default_value_t = SearchKind::Search)]
    kind: SearchKind,

    /// Result count (max 100)
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
    num: u32,

    /// Country code (us, cn, jp, ...)
    #[arg(short, long)]
    gl: Option<String>,

    /// Language (en, zh-cn, ja, ...)
    #[arg(short = 'l', long)]
    hl: Option<String>,

    /// Time filter
    #[arg(long, value_enum)]
    tbs: Option<TimeRange>,

    /// Output raw JSON
    #[arg(short, long)]
    json: bool,

    /// Show debug logs on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn request(&self) -> SearchRequest {
        SearchRequest {
            num: self.num,
            gl: self.gl.clone(),
            hl: self.hl.clone(),
            tbs: self.tbs,
            ..SearchRequest::new(self.query.clone().unwrap_or_default(), self.kind)
        }
    }

    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging("warn", cli.verbose, LogTarget::Stderr);

    match run(&cli).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error_line(&e));
            let code = e.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: &Cli) -> Result<String> {
    let config = SearchConfig::from_env();
    let client = SerperClient::new(&config).context("Search failed")?;
    let app = SearchApp::new(client, config.api_key.clone());

    match app.run(&cli.request(), cli.output_mode()).await {
        Ok(output) => Ok(output),
        // 输入错误原样输出，请求失败加上前缀
        Err(e) if e.kind() == ErrorKind::Operation => Err(anyhow::Error::new(e).context("Search failed")),
        Err(e) => Err(e.into()),
    }
}

/// 输入错误带 `Error: ` 前缀，请求失败已经以 `Search failed` 开头
fn error_line(err: &anyhow::Error) -> String {
    let operation = err
        .downcast_ref::<AppError>()
        .map_or(true, |e| e.kind() == ErrorKind::Operation);
    if operation {
        report(err.as_ref())
    } else {
        format!("Error: {}", report(err.as_ref()))
    }
}
