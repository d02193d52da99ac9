//! stackprobe 命令行入口
//! 扫描单个URL并输出JSON格式的 ScanResult
//!
//! 运行命令：
//! cargo run --features cli -- example.com --pretty

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use env_logger::{Builder, Env, Target};
use stackprobe::{
    ReqwestFetcher, ScanConfig, ScanResult, Scanner, SignatureOrigin, TechDetector,
};

#[derive(Debug, Parser)]
#[command(name = "stackprobe", version, about = "Detect the technology stack behind a website")]
struct Cli {
    /// 目标URL（缺少协议时补全 https://）
    url: String,

    /// 抓取超时（秒）
    #[arg(long, default_value_t = 15)]
    timeout: u64,

    /// 使用本地JSON签名表替代内置签名表
    #[arg(long, value_name = "FILE")]
    signatures: Option<PathBuf>,

    /// HTML无法解析时判定扫描失败
    #[arg(long)]
    strict: bool,

    /// 格式化输出JSON
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn config(&self) -> ScanConfig {
        let origin = match &self.signatures {
            Some(path) => SignatureOrigin::LocalFile(path.clone()),
            None => SignatureOrigin::Embedded,
        };
        ScanConfig::builder()
            .timeout(Duration::from_secs(self.timeout))
            .strict_markup(self.strict)
            .signatures(origin)
            .build()
    }
}

async fn run(cli: &Cli) -> ScanResult {
    let config = cli.config();
    let detector = match TechDetector::new(config) {
        Ok(d) => d,
        Err(e) => return ScanResult::failure(&e),
    };
    let fetcher = match ReqwestFetcher::new(&detector.config().fetch) {
        Ok(f) => f,
        Err(e) => return ScanResult::failure(&e),
    };
    Scanner::new(&detector, fetcher).scan(&cli.url).await
}

#[tokio::main]
async fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();

    let cli = Cli::parse();
    let result = run(&cli).await;

    let rendered = if cli.pretty {
        result.to_json_pretty()
    } else {
        result.to_json()
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("failed to serialize scan result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
