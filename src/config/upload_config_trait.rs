// ==========================================
// 化工设备参数分析系统 - 上传配置读取 Trait
// ==========================================
// 职责: 定义导入/报告模块所需的配置读取接口
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::config_manager::defaults;
use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// UploadConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）, UploadConfig（固定值）
#[async_trait]
pub trait UploadConfigReader: Send + Sync {
    /// 单个上传文件的字节上限
    ///
    /// # 默认值
    /// - 5 MiB
    async fn get_max_upload_bytes(&self) -> ConfigResult<usize>;

    /// PDF 报告标题
    ///
    /// # 默认值
    /// - "Chemical Equipment Parameter Report"
    async fn get_report_title(&self) -> ConfigResult<String>;
}

// ==========================================
// UploadConfig - 固定配置（内存部署 / 测试）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
    pub report_title: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: defaults::UPLOAD_MAX_BYTES,
            report_title: defaults::REPORT_TITLE.to_string(),
        }
    }
}

#[async_trait]
impl UploadConfigReader for UploadConfig {
    async fn get_max_upload_bytes(&self) -> ConfigResult<usize> {
        Ok(self.max_upload_bytes)
    }

    async fn get_report_title(&self) -> ConfigResult<String> {
        Ok(self.report_title.clone())
    }
}
