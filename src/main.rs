//! rsclearurls 命令行入口：清除链接中的追踪参数

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use rsclearurls::{Cleaner, ConfigManager, RetryPolicy, extract_link, is_url};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "rsclearurls", version, about = "Remove tracking metadata from links using ClearURLs rules")]
struct Cli {
    /// 待清理的链接，或包含链接的一段文本
    #[arg(required = true)]
    links: Vec<String>,

    /// 规则清单地址（可重复，按顺序尝试）
    #[arg(long = "rules-url", env = "RSCLEARURLS_RULES_URL", value_delimiter = ',')]
    rules_urls: Vec<String>,

    /// 规则刷新间隔（小时）
    #[arg(long, env = "RSCLEARURLS_REFRESH_HOURS", default_value_t = 24)]
    refresh_hours: u64,

    /// HTTP 超时（秒）
    #[arg(long, env = "RSCLEARURLS_HTTP_TIMEOUT", default_value_t = 30)]
    http_timeout: u64,

    /// 每个地址的重试次数
    #[arg(long, env = "RSCLEARURLS_RETRIES", default_value_t = 1)]
    retries: u8,

    /// 日志级别
    #[arg(long, env = "RSCLEARURLS_LOG_LEVEL", value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// 详细日志，等价于 --log-level debug
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// 日志输出位置：stdout、stderr 或文件路径
    #[arg(long, env = "RSCLEARURLS_LOG_LOCATION", default_value = "stderr")]
    log_location: String,
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.verbose { LogLevel::Debug } else { cli.log_level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rsclearurls={}", level.as_filter())));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match cli.log_location.as_str() {
        "stdout" => builder.with_writer(std::io::stdout).init(),
        "stderr" => builder.with_writer(std::io::stderr).init(),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
    }
    Ok(())
}

/// 参数本身是链接则直接使用，否则从文本中提取
fn resolve_link(input: &str) -> anyhow::Result<String> {
    if is_url(input) {
        return Ok(input.trim().to_string());
    }
    let link = extract_link(input)?;
    if !is_url(&link) {
        bail!("Invalid link: {}", link);
    }
    Ok(link)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut builder = ConfigManager::custom()
        .refresh_hours(cli.refresh_hours)
        .http_timeout(cli.http_timeout)
        .retry(match cli.retries {
            0 => RetryPolicy::Never,
            n => RetryPolicy::Times(n),
        });
    if !cli.rules_urls.is_empty() {
        builder = builder.rules_urls(cli.rules_urls.clone());
    }
    let config = builder.build();
    debug!("Using config: {:?}", config);

    let cleaner = Cleaner::new(config).context("failed to build cleaner")?;

    let mut failed = false;
    for input in &cli.links {
        let link = match resolve_link(input) {
            Ok(link) => link,
            Err(e) => {
                error!("{}", e);
                eprintln!("Invalid link: {}", input);
                failed = true;
                continue;
            }
        };

        match cleaner.strip_trackers(&link).await {
            Ok(cleaned) => println!("Link without trackers: {}", cleaned),
            Err(e) => {
                error!("{}", e);
                bail!("Cannot strip trackers right now: {}", e);
            }
        }
    }

    if failed {
        bail!("some inputs did not contain a valid link");
    }
    Ok(())
}
