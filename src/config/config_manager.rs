// ==========================================
// 化工设备参数分析系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)，本系统只使用 global scope
// ==========================================

use crate::config::upload_config_trait::{ConfigResult, UploadConfigReader};
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 并建表（均幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?)
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global 配置（UPSERT）
    pub fn update_config(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式，按 key 排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// UploadConfigReader Trait 实现
// ==========================================
#[async_trait]
impl UploadConfigReader for ConfigManager {
    async fn get_max_upload_bytes(&self) -> ConfigResult<usize> {
        let default = defaults::UPLOAD_MAX_BYTES.to_string();
        let value = self.get_config_or_default(config_keys::UPLOAD_MAX_BYTES, &default)?;
        Ok(value.trim().parse::<usize>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::UPLOAD_MAX_BYTES,
                raw_value = %value,
                "上传大小上限配置格式错误，使用默认值"
            );
            defaults::UPLOAD_MAX_BYTES
        }))
    }

    async fn get_report_title(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::REPORT_TITLE, defaults::REPORT_TITLE)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(defaults::REPORT_TITLE.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 上传
    pub const UPLOAD_MAX_BYTES: &str = "upload_max_bytes";

    // 报告
    pub const REPORT_TITLE: &str = "report_title";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;
    pub const REPORT_TITLE: &str = "Chemical Equipment Parameter Report";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_manager() -> (NamedTempFile, ConfigManager) {
        let temp_file = NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(temp_file.path().to_str().unwrap()).unwrap();
        (temp_file, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let (_tmp, manager) = create_manager();
        assert_eq!(
            manager.get_max_upload_bytes().await.unwrap(),
            defaults::UPLOAD_MAX_BYTES
        );
        assert_eq!(
            manager.get_report_title().await.unwrap(),
            defaults::REPORT_TITLE
        );
    }

    #[tokio::test]
    async fn test_update_overrides_default() {
        let (_tmp, manager) = create_manager();
        manager.update_config(config_keys::UPLOAD_MAX_BYTES, "1024").unwrap();
        manager.update_config(config_keys::REPORT_TITLE, "Plant A").unwrap();
        manager.update_config(config_keys::REPORT_TITLE, "Plant B").unwrap();

        assert_eq!(manager.get_max_upload_bytes().await.unwrap(), 1024);
        assert_eq!(manager.get_report_title().await.unwrap(), "Plant B");
    }

    #[tokio::test]
    async fn test_malformed_limit_falls_back() {
        let (_tmp, manager) = create_manager();
        manager.update_config(config_keys::UPLOAD_MAX_BYTES, "lots").unwrap();
        assert_eq!(
            manager.get_max_upload_bytes().await.unwrap(),
            defaults::UPLOAD_MAX_BYTES
        );
    }

    #[test]
    fn test_snapshot_sorted_by_key() {
        let (_tmp, manager) = create_manager();
        manager.update_config(config_keys::UPLOAD_MAX_BYTES, "2048").unwrap();
        manager.update_config(config_keys::REPORT_TITLE, "T").unwrap();

        let snapshot = manager.get_config_snapshot().unwrap();
        assert_eq!(snapshot, r#"{"report_title":"T","upload_max_bytes":"2048"}"#);
    }
}
