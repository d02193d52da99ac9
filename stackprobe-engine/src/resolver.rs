//! 身份归并：同名技术只保留首次命中
//! 规则：
//! 1. 按技术名精确匹配（区分大小写）去重
//! 2. 输出顺序为首次命中顺序，后续命中被吸收，不更新已有记录
//! 3. 不做排序、不做置信度计算

use rustc_hash::FxHashSet;

use crate::core::{DetectionHit, TechnologyRecord};

#[derive(Debug, Default)]
pub struct IdentityResolver {
    seen: FxHashSet<String>,
    records: Vec<TechnologyRecord>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 吸收一条命中，返回是否产生了新记录
    pub fn absorb(&mut self, hit: &DetectionHit) -> bool {
        if self.seen.contains(&hit.tech) {
            return false;
        }
        self.seen.insert(hit.tech.clone());
        self.records.push(TechnologyRecord::from(hit));
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> Vec<TechnologyRecord> {
        self.records
    }

    /// 一次性归并有序命中列表
    pub fn resolve<'a, I>(hits: I) -> Vec<TechnologyRecord>
    where
        I: IntoIterator<Item = &'a DetectionHit>,
    {
        let mut resolver = Self::new();
        for hit in hits {
            resolver.absorb(hit);
        }
        resolver.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, SignalKind};

    fn hit(tech: &str, category: Category, icon: &str, rule_index: usize) -> DetectionHit {
        DetectionHit {
            tech: tech.to_string(),
            category,
            icon: icon.to_string(),
            rule_index,
            signal: SignalKind::RawBodyLower,
        }
    }

    #[test]
    fn first_hit_wins_and_order_is_stable() {
        let hits = vec![
            hit("Cloudflare", Category::SecurityCdn, "cloudflare", 0),
            hit("WordPress", Category::Cms, "wordpress", 1),
            hit("Cloudflare", Category::Hosting, "other", 2),
            hit("jQuery", Category::Library, "jquery", 3),
        ];
        let records = IdentityResolver::resolve(&hits);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Cloudflare", "WordPress", "jQuery"]);
        assert_eq!(records[0].category, Category::SecurityCdn);
        assert_eq!(records[0].icon_url, "https://cdn.simpleicons.org/cloudflare");
    }

    #[test]
    fn names_are_case_sensitive() {
        let hits = vec![
            hit("jQuery", Category::Library, "jquery", 0),
            hit("JQuery", Category::Library, "jquery", 1),
        ];
        assert_eq!(IdentityResolver::resolve(&hits).len(), 2);
    }

    #[test]
    fn resolving_twice_is_stable() {
        let hits = vec![
            hit("React", Category::Library, "react", 0),
            hit("React", Category::Library, "react", 5),
        ];
        assert_eq!(IdentityResolver::resolve(&hits), IdentityResolver::resolve(&hits));
        assert_eq!(IdentityResolver::resolve(&hits).len(), 1);
    }

    #[test]
    fn absorb_reports_new_records() {
        let mut resolver = IdentityResolver::new();
        assert!(resolver.absorb(&hit("Vercel", Category::Hosting, "vercel", 0)));
        assert!(!resolver.absorb(&hit("Vercel", Category::Hosting, "vercel", 1)));
        assert_eq!(resolver.len(), 1);
    }
}
