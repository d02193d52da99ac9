use std::fmt::{self, Write};

// ======================== 日志预览工具函数 ========================
/// 命中位置附近的上下文预览（空白折叠，零堆分配）
/// 逻辑：
/// 1. 以命中区间为中心，向两侧各扩展 radius 字节（对齐字符边界）
/// 2. 连续空白折叠为单个空格，换行不会打断日志行
/// 3. 被截断的一侧输出 "…"
#[inline(always)]
pub fn match_snippet(input: &str, start: usize, end: usize, radius: usize) -> impl fmt::Display + '_ {
    struct Snippet<'a> {
        source: &'a str,
        from: usize,
        to: usize,
    }

    impl fmt::Display for Snippet<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if self.from > 0 {
                f.write_char('…')?;
            }
            let mut last_was_whitespace = false;
            for ch in self.source[self.from..self.to].chars() {
                if ch.is_whitespace() {
                    if !last_was_whitespace {
                        f.write_char(' ')?;
                        last_was_whitespace = true;
                    }
                } else {
                    f.write_char(ch)?;
                    last_was_whitespace = false;
                }
            }
            if self.to < self.source.len() {
                f.write_char('…')?;
            }
            Ok(())
        }
    }

    let end = end.min(input.len());
    let start = start.min(end);
    let mut from = start.saturating_sub(radius);
    while !input.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = end.saturating_add(radius).min(input.len());
    while !input.is_char_boundary(to) {
        to += 1;
    }

    Snippet {
        source: input,
        from,
        to,
    }
}
