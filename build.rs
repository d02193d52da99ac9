// build.rs
// 1. 读取JSON格式构建配置
// 2. 读取签名表JSON，逐条编译校验（任何无效规则直接中断构建）
// 3. 最小化序列化 + 可选LZ4压缩后写入OUT_DIR
// 4. 产物供主程序通过include_bytes!固化进最终二进制
use serde::Deserialize;
use stackprobe_engine::{SignatureTable, TechSignature};
use std::error::Error;
use std::{fs, path::Path};

/// 构建期配置结构体
#[derive(Debug, Deserialize)]
struct BuildConfig {
    /// 签名表文件路径
    signatures_json_path: String,
    /// 产物文件名
    compiled_table_output_name: String,
    /// 是否启用LZ4压缩
    enable_compress: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    // 未开启嵌入式签名表feature时不执行构建逻辑
    if std::env::var("CARGO_FEATURE_EMBEDDED_SIGNATURES").is_err() {
        return Ok(());
    }

    println!("cargo:rerun-if-changed=build_config.json");
    println!("cargo:rerun-if-changed=data/");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("build_config.json");
    let config_content = fs::read_to_string(config_path)
        .map_err(|e| format!("读取构建配置文件失败: {} - {}", config_path.display(), e))?;
    let cfg = serde_json::from_str::<BuildConfig>(&config_content)
        .map_err(|e| format!("解析build_config.json失败: {}", e))?;

    println!("cargo:rerun-if-changed={}", cfg.signatures_json_path);

    let json_path = Path::new(&cfg.signatures_json_path);
    let json_content = fs::read_to_string(json_path)
        .map_err(|e| format!("读取签名表失败: {} - {}", json_path.display(), e))?;

    // 分组格式解析，严格模式编译：内置签名表不允许存在被跳过的规则
    let signatures: Vec<TechSignature> = serde_json::from_str(&json_content)
        .map_err(|e| format!("解析签名表JSON失败: {}", e))?;
    let table = SignatureTable::from_signatures(signatures.clone())
        .into_strict()
        .map_err(|e| format!("签名表校验失败: {}", e))?;

    println!(
        "cargo:warning=签名表校验通过: {} 条规则 / {} 项技术",
        table.len(),
        table.technology_count()
    );

    // 最小化序列化
    let minified = serde_json::to_vec(&signatures)
        .map_err(|e| format!("JSON序列化签名表失败: {}", e))?;

    let payload = if cfg.enable_compress {
        use lz4_flex::compress_prepend_size;
        compress_prepend_size(&minified)
    } else {
        minified
    };

    let out_dir = std::env::var("OUT_DIR")?;
    let out_path = Path::new(&out_dir).join(&cfg.compiled_table_output_name);
    fs::write(&out_path, &payload)
        .map_err(|e| format!("写入签名表产物失败: {} - {}", out_path.display(), e))?;

    // 向编译环境注入构建配置常量，供lib.rs读取
    println!(
        "cargo:rustc-env=SIGNATURE_TABLE_FILENAME={}",
        cfg.compiled_table_output_name
    );
    println!(
        "cargo:rustc-env=SIGNATURE_TABLE_COMPRESSED={}",
        cfg.enable_compress
    );

    Ok(())
}
