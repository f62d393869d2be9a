// ==========================================
// 化工设备参数分析系统 - 用户历史索引
// ==========================================
// 职责:
// - OwnerHistory: 固定容量的有序历史（环形缓冲，O(1) 淘汰）
// - OwnerLockRegistry: 每个用户独立的锁作用域
// 红线: 同一用户的"追加 + 淘汰"必须串行；不同用户互不阻塞
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

// ==========================================
// HistorySlot - 历史条目索引
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySlot {
    pub dataset_id: String,
    pub uploaded_at: DateTime<Utc>,
}

// ==========================================
// OwnerHistory - 固定容量历史
// ==========================================
// 不变量: len() <= capacity；队尾为最新，插入顺序即时间顺序
#[derive(Debug, Clone)]
pub struct OwnerHistory {
    capacity: usize,
    slots: VecDeque<HistorySlot>,
}

impl OwnerHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            slots: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 分配上传时间：不早于当前最新条目（时钟回拨时保持时间序 == 插入序）
    pub fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.slots.back() {
            Some(last) if last.uploaded_at > now => last.uploaded_at,
            _ => now,
        }
    }

    /// 追加新条目；超出容量时返回被淘汰的最旧条目
    pub fn push(&mut self, slot: HistorySlot) -> Option<HistorySlot> {
        self.slots.push_back(slot);
        if self.slots.len() > self.capacity {
            self.slots.pop_front()
        } else {
            None
        }
    }

    pub fn newest(&self) -> Option<&HistorySlot> {
        self.slots.back()
    }

    /// 最新在前
    pub fn newest_first(&self) -> impl Iterator<Item = &HistorySlot> {
        self.slots.iter().rev()
    }
}

// ==========================================
// OwnerLockRegistry - 用户锁注册表
// ==========================================
// 说明: 注册表锁只在查找/创建槽位时短暂持有；
//      真正的临界区在各用户自己的 RwLock 内
pub struct OwnerLockRegistry<T> {
    slots: RwLock<HashMap<String, Arc<RwLock<T>>>>,
    init: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> OwnerLockRegistry<T> {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            slots: RwLock::new(HashMap::new()),
            init: Box::new(init),
        }
    }

    /// 获取（必要时创建）用户槽位
    pub fn slot(&self, owner: &str) -> RepositoryResult<Arc<RwLock<T>>> {
        {
            let slots = self
                .slots
                .read()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            if let Some(slot) = slots.get(owner) {
                return Ok(slot.clone());
            }
        }

        let mut slots = self
            .slots
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let slot = slots
            .entry(owner.to_string())
            .or_insert_with(|| Arc::new(RwLock::new((self.init)())));
        Ok(slot.clone())
    }

    /// 获取已存在的用户槽位（只读路径不创建）
    pub fn existing(&self, owner: &str) -> RepositoryResult<Option<Arc<RwLock<T>>>> {
        let slots = self
            .slots
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(slots.get(owner).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn slot(id: &str, at: DateTime<Utc>) -> HistorySlot {
        HistorySlot {
            dataset_id: id.to_string(),
            uploaded_at: at,
        }
    }

    #[test]
    fn test_push_evicts_oldest_beyond_capacity() {
        let mut history = OwnerHistory::with_capacity(5);
        let t0 = Utc::now();

        for i in 0..5 {
            assert!(history
                .push(slot(&format!("d{}", i), t0 + Duration::seconds(i)))
                .is_none());
        }
        let evicted = history.push(slot("d5", t0 + Duration::seconds(5)));

        assert_eq!(evicted.map(|s| s.dataset_id), Some("d0".to_string()));
        assert_eq!(history.len(), 5);
        assert!(history.newest_first().all(|s| s.dataset_id != "d0"));
        assert_eq!(history.newest().map(|s| s.dataset_id.as_str()), Some("d5"));
    }

    #[test]
    fn test_newest_first_order() {
        let mut history = OwnerHistory::with_capacity(3);
        let t0 = Utc::now();
        for i in 0..4 {
            history.push(slot(&format!("d{}", i), t0 + Duration::seconds(i)));
        }

        let ids: Vec<&str> = history.newest_first().map(|s| s.dataset_id.as_str()).collect();
        assert_eq!(ids, vec!["d3", "d2", "d1"]);
    }

    #[test]
    fn test_next_timestamp_never_goes_backwards() {
        let mut history = OwnerHistory::with_capacity(5);
        let t0 = Utc::now();
        history.push(slot("d0", t0));

        let earlier = t0 - Duration::seconds(10);
        assert_eq!(history.next_timestamp(earlier), t0);

        let later = t0 + Duration::seconds(1);
        assert_eq!(history.next_timestamp(later), later);
    }

    #[test]
    fn test_registry_returns_same_slot_per_owner() {
        let registry: OwnerLockRegistry<OwnerHistory> =
            OwnerLockRegistry::new(|| OwnerHistory::with_capacity(5));

        let a1 = registry.slot("alice").unwrap();
        let a2 = registry.slot("alice").unwrap();
        let b = registry.slot("bob").unwrap();

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));
        assert!(registry.existing("carol").unwrap().is_none());
    }
}
