/// 安全转小写，仅转换ASCII字符，多字节字符原样保留
#[inline(always)]
pub fn safe_lowercase(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// ASCII忽略大小写的子串查找（needle须已是小写）
#[inline]
pub fn contains_ignore_ascii_case(haystack: &str, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    let hay = haystack.as_bytes();
    let needle = needle_lower.as_bytes();
    if needle.len() > hay.len() {
        return false;
    }
    hay.windows(needle.len())
        .any(|w| w.iter().zip(needle).all(|(a, b)| a.to_ascii_lowercase() == *b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_only_lowering() {
        assert_eq!(safe_lowercase("Next.JS Ünïcode"), "next.js Ünïcode");
    }

    #[test]
    fn ignore_case_contains() {
        assert!(contains_ignore_ascii_case("Server: CloudFlare", "cloudflare"));
        assert!(!contains_ignore_ascii_case("nginx", "cloudflare"));
        assert!(!contains_ignore_ascii_case("ab", "abc"));
    }
}
