// ==========================================
// 化工设备参数分析系统 - 设备导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 结构校验 → 汇总 → 落库
// ==========================================

use crate::domain::{EquipmentRecord, RawEquipmentRow, RawTable, Summary};
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// EquipmentImporter Trait
// ==========================================
// 用途: 设备数据导入主接口（数据集仓储的唯一写入路径）
// 实现者: EquipmentImporterImpl
#[async_trait]
pub trait EquipmentImporter: Send + Sync {
    /// 上传 CSV 并生成数据集
    ///
    /// # 参数
    /// - owner: 已认证用户标识
    /// - file_name: 原始文件名（用于扩展名校验与历史展示）
    /// - raw_bytes: 文件原始字节
    ///
    /// # 返回
    /// - Ok(Summary): 新数据集的汇总统计（不含原始记录）
    /// - Err: 任何阶段失败均不落库
    async fn upload(&self, owner: &str, file_name: &str, raw_bytes: &[u8])
        -> ImportResult<Summary>;

    /// 批量上传多个文件（并发执行）
    ///
    /// # 说明
    /// - 每个文件独立导入，某个文件失败不影响其他文件
    /// - 结果顺序与输入顺序一致
    async fn batch_upload(
        &self,
        owner: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> Vec<ImportResult<Summary>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser
pub trait FileParser: Send + Sync {
    /// 解析原始字节为表格（表头 + 行记录）
    ///
    /// # 参数
    /// - file_name: 文件名（扩展名校验）
    /// - raw_bytes: 文件内容
    /// - max_upload_bytes: 允许的最大字节数（来自配置）
    fn parse_to_raw_table(
        &self,
        file_name: &str,
        raw_bytes: &[u8],
        max_upload_bytes: usize,
    ) -> ImportResult<RawTable>;
}

// ==========================================
// SchemaValidator Trait
// ==========================================
// 用途: 结构与类型校验接口（阶段 1）
// 实现者: importer::schema_validator::SchemaValidator
// 策略: 严格全有或全无，首个错误行即拒绝整个上传
pub trait SchemaValidator: Send + Sync {
    /// 校验表头是否包含全部必需列
    fn validate_headers(&self, headers: &[String]) -> ImportResult<()>;

    /// 将单行转换为设备记录
    fn parse_row(&self, row: &RawEquipmentRow) -> ImportResult<EquipmentRecord>;

    /// 校验整张表并输出有序设备记录
    fn validate(&self, table: &RawTable) -> ImportResult<Vec<EquipmentRecord>> {
        self.validate_headers(&table.headers)?;
        let records = table
            .rows
            .iter()
            .map(|row| self.parse_row(row))
            .collect::<ImportResult<Vec<_>>>()?;
        if records.is_empty() {
            return Err(crate::importer::error::ImportError::EmptyDatasetError);
        }
        Ok(records)
    }
}
