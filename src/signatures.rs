//! 签名表加载
//! 1. 内置签名表：build.rs 校验 + 压缩后 include_bytes! 固化，运行期首次访问时解压编译
//! 2. 本地签名表：运行时读取JSON文件
//! 两种来源都会额外校验结构标记选择器语法（由HTML解析层负责）

use std::path::Path;
use std::sync::Arc;

use stackprobe_engine::{SignalKind, SignatureTable};

use crate::config::SignatureOrigin;
use crate::error::{ProbeResult, StackProbeError};
use crate::utils::extractor::validate_selector;

/// 剔除无法解析的结构标记选择器规则
pub fn reject_invalid_selectors(table: &mut SignatureTable) -> usize {
    table.reject_where(|rule| {
        if rule.signal != SignalKind::StructuralMarkers {
            return None;
        }
        rule.key.as_deref().and_then(validate_selector)
    })
}

/// 从JSON文件加载签名表
pub fn load_local_file(path: &Path) -> ProbeResult<SignatureTable> {
    let bytes = std::fs::read(path).map_err(|e| {
        StackProbeError::TableLoadError(format!("failed to read {}: {}", path.display(), e))
    })?;
    let mut table = SignatureTable::from_json_slice(&bytes)?;
    reject_invalid_selectors(&mut table);
    log::info!(
        "Signature table loaded from {} | Rules: {} | Technologies: {} | Skipped: {}",
        path.display(),
        table.len(),
        table.technology_count(),
        table.skipped().len()
    );
    Ok(table)
}

/// 按来源加载签名表
pub fn load(origin: &SignatureOrigin) -> ProbeResult<Arc<SignatureTable>> {
    match origin {
        SignatureOrigin::Embedded => {
            #[cfg(feature = "embedded-signatures")]
            {
                embedded::table()
            }
            #[cfg(not(feature = "embedded-signatures"))]
            {
                Err(StackProbeError::FeatureDisabled(
                    "embedded-signatures feature is disabled, cannot use the embedded signature table. Please enable this feature or use a local signature file.".to_string(),
                ))
            }
        }
        SignatureOrigin::LocalFile(path) => load_local_file(path).map(Arc::new),
    }
}

// 嵌入式签名表 - 仅在开启embedded-signatures特性时编译
#[cfg(feature = "embedded-signatures")]
pub mod embedded {
    use super::*;
    use lz4_flex::decompress_size_prepended;
    use once_cell::sync::Lazy;

    // 文件名由build_config.json配置，build.rs注入环境变量
    static SIGNATURES_PAYLOAD: &[u8] =
        include_bytes!(concat!(env!("OUT_DIR"), "/", env!("SIGNATURE_TABLE_FILENAME")));

    const COMPRESSED: &str = env!("SIGNATURE_TABLE_COMPRESSED");

    fn decode() -> ProbeResult<SignatureTable> {
        let json = if COMPRESSED == "true" {
            decompress_size_prepended(SIGNATURES_PAYLOAD).map_err(|e| {
                StackProbeError::TableLoadError(format!(
                    "LZ4解压缩签名表失败: {:?}, 压缩包字节长度: {}",
                    e,
                    SIGNATURES_PAYLOAD.len()
                ))
            })?
        } else {
            SIGNATURES_PAYLOAD.to_vec()
        };
        let mut table = SignatureTable::from_json_slice(&json)?;
        reject_invalid_selectors(&mut table);
        Ok(table)
    }

    /// 全局懒加载的签名表单例 - 进程内仅一份实例，线程安全
    static EMBEDDED_TABLE: Lazy<Result<Arc<SignatureTable>, String>> = Lazy::new(|| {
        decode().map(Arc::new).map_err(|e| {
            log::error!("Embedded signature table failed to load: {}", e);
            e.to_string()
        })
    });

    /// 获取内置签名表（共享同一实例）
    pub fn table() -> ProbeResult<Arc<SignatureTable>> {
        match &*EMBEDDED_TABLE {
            Ok(table) => Ok(Arc::clone(table)),
            Err(e) => Err(StackProbeError::TableLoadError(e.clone())),
        }
    }
}
