// ==========================================
// 化工设备参数分析系统 - 导入层
// ==========================================
// 职责: 外部 CSV 导入,生成设备数据集
// 流程: 解析 → 结构校验 → 汇总 → 落库
// ==========================================

// 模块声明
pub mod equipment_importer_impl;
pub mod equipment_importer_trait;
pub mod error;
pub mod file_parser;
pub mod schema_validator;

// 重导出核心类型
pub use equipment_importer_impl::EquipmentImporterImpl;
pub use error::{ImportError, ImportResult};
pub use file_parser::CsvParser;
pub use schema_validator::SchemaValidator as SchemaValidatorImpl;

// 重导出 Trait 接口
pub use equipment_importer_trait::{EquipmentImporter, FileParser, SchemaValidator};
