//! Header格式转换工具
use http::header::HeaderMap;
use log::warn;
use rustc_hash::FxHashMap;

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 单次转换Header数量上限
    pub const MAX_HEADERS: usize = 1000;

    /// 将HeaderMap转换为 小写名称 → 值 的单值映射
    /// 同名Header按出现顺序以 ", " 拼接；非UTF-8字节按有损方式转换
    pub fn to_joined_map(headers: &HeaderMap) -> FxHashMap<String, String> {
        let mut map: FxHashMap<String, String> = FxHashMap::default();

        for (iter_count, (key, value)) in headers.iter().enumerate() {
            if iter_count >= Self::MAX_HEADERS {
                warn!(
                    "Header iteration exceeded {}, remaining headers ignored",
                    Self::MAX_HEADERS
                );
                break;
            }

            // HeaderName 本身已是小写
            let value = String::from_utf8_lossy(value.as_bytes());
            map.entry(key.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }
        map
    }

    /// 从 (名称, 值) 列表构建HeaderMap，非法项跳过
    pub fn from_pairs<'a, I>(pairs: I) -> HeaderMap
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            match (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => {
                    headers.append(n, v);
                }
                _ => warn!("Skipping invalid header: {}", name),
            }
        }
        headers
    }
}
