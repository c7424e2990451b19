// ==========================================
// 考勤导入引擎 - 员工解析器
// ==========================================
// 职责: 原始员工标识 (数字 ID 或邮箱) → 规范员工记录
// 缓存: 按标识字符串记忆化, 生命周期 = 单次导入运行
// 红线: 缓存显式持有, 不做跨运行共享; 查不到不是错误
// ==========================================

use crate::domain::attendance::Employee;
use crate::repository::attendance_repo::EmployeeStore;
use std::collections::HashMap;
use std::error::Error;
use tracing::debug;

// ==========================================
// EmployeeResolver - 带记忆化的员工解析
// ==========================================
// 同一员工重复出现的行只触发一次查找; 未命中也缓存
pub struct EmployeeResolver<'a> {
    store: &'a dyn EmployeeStore,
    cache: HashMap<String, Option<Employee>>,
}

impl<'a> EmployeeResolver<'a> {
    /// 每次导入运行创建一个新实例
    pub fn new(store: &'a dyn EmployeeStore) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// 解析原始员工标识
    ///
    /// - 空标识 → Ok(None), 不触发查找
    /// - 纯数字 → 按主键查找
    /// - 其它 → 按邮箱精确查找
    /// - Err 仅在员工库不可达时出现 (批次级错误)
    pub async fn resolve(&mut self, raw: &str) -> Result<Option<Employee>, Box<dyn Error>> {
        let key = raw.trim();
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(cached) = self.cache.get(key) {
            return Ok(cached.clone());
        }

        let resolved = if key.chars().all(|c| c.is_ascii_digit()) {
            match key.parse::<u64>() {
                Ok(id) => self.store.find_by_id(id).await?,
                // 纯数字但超出 u64 范围, 视同查不到
                Err(_) => None,
            }
        } else {
            self.store.find_by_email(key).await?
        };

        debug!(identifier = key, hit = resolved.is_some(), "员工解析");
        self.cache.insert(key.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// 缓存条目数 (测试用)
    #[cfg(test)]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 记录查找次数的内存员工库
    struct CountingStore {
        lookups: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmployeeStore for CountingStore {
        async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, Box<dyn Error>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if id == 5 {
                Ok(Some(Employee {
                    id: 5,
                    email: "zhang.wei@example.com".to_string(),
                    full_name: Some("张伟".to_string()),
                }))
            } else {
                Ok(None)
            }
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, Box<dyn Error>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if email == "zhang.wei@example.com" {
                Ok(Some(Employee {
                    id: 5,
                    email: email.to_string(),
                    full_name: Some("张伟".to_string()),
                }))
            } else {
                Ok(None)
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_by_id_and_email() {
        let store = CountingStore::new();
        let mut resolver = EmployeeResolver::new(&store);

        let by_id = resolver.resolve("5").await.unwrap();
        assert_eq!(by_id.as_ref().map(|e| e.id), Some(5));

        let by_email = resolver.resolve("zhang.wei@example.com").await.unwrap();
        assert_eq!(by_email.as_ref().map(|e| e.id), Some(5));
    }

    #[tokio::test]
    async fn test_resolve_empty_no_lookup() {
        let store = CountingStore::new();
        let mut resolver = EmployeeResolver::new(&store);

        assert!(resolver.resolve("").await.unwrap().is_none());
        assert!(resolver.resolve("   ").await.unwrap().is_none());
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_memoizes_hits_and_misses() {
        let store = CountingStore::new();
        let mut resolver = EmployeeResolver::new(&store);

        for _ in 0..3 {
            resolver.resolve("5").await.unwrap();
        }
        // 未命中同样缓存
        for _ in 0..3 {
            assert!(resolver.resolve("999").await.unwrap().is_none());
        }

        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cache_len(), 2);
    }

    #[tokio::test]
    async fn test_non_numeric_goes_to_email_lookup() {
        let store = CountingStore::new();
        let mut resolver = EmployeeResolver::new(&store);

        // "E999" 不是纯数字, 走邮箱查找并未命中
        assert!(resolver.resolve("E999").await.unwrap().is_none());
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }
}
