//! Offline detection demonstration for stackprobe
//! stackprobe 离线检测演示程序
//! 功能说明：
//! 1. 使用内置签名表初始化检测器
//! 2. 对本地样例响应（Header + HTML）执行完整检测，不发起网络请求
//! 3. 输出耗时统计与结构化JSON结果
//!
//! 运行命令：
//! cargo run --example scan_demo

use std::error::Error;
use std::time::Instant;

use env_logger::{Builder, Env, Target};
use serde_json::to_string_pretty;
use stackprobe::{HeaderConverter, ScanConfig, ScanResult, TechDetector};

const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Acme Storefront</title>
  <meta name="description" content="Everything you need, shipped fast.">
  <meta name="generator" content="WordPress 6.5.2">
  <link rel="stylesheet" href="https://fonts.googleapis.com/css2?family=Inter">
  <link rel="stylesheet" href="/wp-content/themes/acme/bootstrap.min.css">
  <script src="https://www.googletagmanager.com/gtag/js?id=G-XXXX"></script>
  <script src="/wp-includes/js/jquery/jquery.min.js"></script>
  <script>window.dataLayer = window.dataLayer || [];</script>
</head>
<body class="home woocommerce-page">
  <div id="page" class="container"><h1>Acme</h1></div>
</body>
</html>"#;

fn main() -> Result<(), Box<dyn Error>> {
    // ========== 1. 日志系统初始化 ==========
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .init();

    // ========== 2. 初始化内置签名表检测器 ==========
    let detector = TechDetector::with_embedded_signatures(ScanConfig::default())?;
    println!(
        "✅ 检测器初始化完成 | 规则数: {} | 技术数: {}",
        detector.table().len(),
        detector.table().technology_count()
    );

    // ========== 3. 样例响应 ==========
    let headers = HeaderConverter::from_pairs([
        ("Server", "cloudflare"),
        ("CF-RAY", "8a1b2c3d4e5f-SJC"),
        ("Content-Type", "text/html; charset=UTF-8"),
    ]);

    // ========== 4. 执行检测（带分阶段耗时日志） ==========
    let start = Instant::now();
    let detection = detector.detect_log(&headers, SAMPLE_HTML.as_bytes())?;
    println!(
        "✅ 检测完成 | 总耗时: {:.3} 毫秒",
        start.elapsed().as_secs_f64() * 1000.0
    );

    // ========== 5. 输出结构化结果 ==========
    let result = ScanResult::success(
        "https://acme.example",
        true,
        detection.metadata.clone(),
        detection.technologies.clone(),
    );
    println!("📊 检测结果（结构化JSON）:\n{}", to_string_pretty(&result)?);
    println!("🔎 原始命中数: {} | 结构化解析: {}", detection.hit_count, detection.markup_parsed);

    Ok(())
}
