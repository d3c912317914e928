use std::collections::HashSet;

/// 块名分配器：单调计数器生成 `B000001` 形式的令牌，并记录已分配的名字。
#[derive(Debug, Default)]
pub struct NameAllocator {
    counter: u64,
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_token(&mut self) -> String {
        self.counter += 1;
        format!("B{:06}", self.counter)
    }

    /// `base_Bnnnnnn`；`base` 为空时只用令牌。
    ///
    /// 标识与令牌之间以 `_` 分隔。
    pub fn unique(&mut self, base: &str) -> String {
        loop {
            let token = self.fresh_token();
            let candidate = if base.is_empty() {
                token
            } else {
                format!("{base}_{token}")
            };
            if self.reserve(&candidate) {
                return candidate;
            }
        }
    }

    /// 优先使用 `base + suffix`，已被占用时在两者之间插入新令牌。
    pub fn unique_or(&mut self, base: &str, suffix: &str) -> String {
        let stem = if base.is_empty() {
            self.fresh_token()
        } else {
            base.to_string()
        };
        let candidate = format!("{stem}{suffix}");
        if self.reserve(&candidate) {
            return candidate;
        }
        loop {
            let candidate = format!("{stem}_{}{suffix}", self.fresh_token());
            if self.reserve(&candidate) {
                return candidate;
            }
        }
    }

    /// 登记外部已占用的名字；名字已存在时返回 `false`。
    pub fn reserve(&mut self, name: &str) -> bool {
        if self.used.contains(name) {
            return false;
        }
        self.used.insert(name.to_string())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
