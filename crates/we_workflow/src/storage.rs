// crates/we_workflow/src/storage.rs

//! 任务注册表
//!
//! 引擎只在内存中保存任务，不定义任何持久化格式。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::cell::TaskCell;
use crate::job::TaskId;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 任务不存在
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// 任务已存在
    #[error("Task already exists: {0}")]
    AlreadyExists(TaskId),

    /// 存储已满
    #[error("Task store is full (capacity {0})")]
    Full(usize),
}

/// 任务注册表trait
pub trait TaskStore: Send + Sync {
    /// 插入任务
    fn insert(&self, cell: Arc<TaskCell>) -> Result<(), StorageError>;

    /// 获取任务
    fn get(&self, id: TaskId) -> Option<Arc<TaskCell>>;

    /// 移除任务
    fn remove(&self, id: TaskId) -> Result<Arc<TaskCell>, StorageError>;

    /// 列出所有任务
    fn list(&self) -> Vec<Arc<TaskCell>>;

    /// 检查任务是否存在
    fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// 获取任务数量
    fn count(&self) -> usize {
        self.list().len()
    }

    /// 清空所有任务
    fn clear(&self);
}

/// 内存注册表
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, Arc<TaskCell>>>,
    max_capacity: Option<usize>,
}

impl MemoryTaskStore {
    /// 创建无容量限制的注册表
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            max_capacity: None,
        }
    }

    /// 创建带容量限制的注册表
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            tasks: RwLock::new(HashMap::with_capacity(max_capacity)),
            max_capacity: Some(max_capacity),
        }
    }

    /// 获取当前任务数量
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }
}

impl TaskStore for MemoryTaskStore {
    fn insert(&self, cell: Arc<TaskCell>) -> Result<(), StorageError> {
        let mut tasks = self.tasks.write();
        let id = cell.id();

        if tasks.contains_key(&id) {
            return Err(StorageError::AlreadyExists(id));
        }
        if let Some(max) = self.max_capacity {
            if tasks.len() >= max {
                return Err(StorageError::Full(max));
            }
        }

        tasks.insert(id, cell);
        Ok(())
    }

    fn get(&self, id: TaskId) -> Option<Arc<TaskCell>> {
        self.tasks.read().get(&id).cloned()
    }

    fn remove(&self, id: TaskId) -> Result<Arc<TaskCell>, StorageError> {
        self.tasks
            .write()
            .remove(&id)
            .ok_or(StorageError::NotFound(id))
    }

    fn list(&self) -> Vec<Arc<TaskCell>> {
        self.tasks.read().values().cloned().collect()
    }

    fn count(&self) -> usize {
        self.tasks.read().len()
    }

    fn clear(&self) {
        self.tasks.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FrameCache;
    use crate::job::SimulationTask;
    use we_config::{Region, SimulationRequest};

    fn cell() -> Arc<TaskCell> {
        let request = SimulationRequest::new(Region::new(0.0, 0.0, 1.0, 1.0));
        Arc::new(TaskCell::new(
            SimulationTask::new(request, 1, 1),
            FrameCache::new(None),
            None,
        ))
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTaskStore::new();
        let a = cell();
        let id = a.id();

        store.insert(Arc::clone(&a)).unwrap();
        assert!(store.contains(id));
        assert_eq!(store.count(), 1);
        assert!(matches!(store.insert(a), Err(StorageError::AlreadyExists(_))));

        store.remove(id).unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.remove(id), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_capacity() {
        let store = MemoryTaskStore::with_capacity(1);
        store.insert(cell()).unwrap();
        assert!(matches!(store.insert(cell()), Err(StorageError::Full(1))));

        store.clear();
        assert_eq!(store.len(), 0);
        store.insert(cell()).unwrap();
    }
}
