// ==========================================
// 化工设备参数分析系统 - 设备领域模型
// ==========================================
// 职责: 定义设备记录、原始行、必需列
// 用途: 导入层写入,引擎层/报告层只读
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// 必需列（精确列名，区分大小写）
// ==========================================
pub const COLUMN_EQUIPMENT_NAME: &str = "Equipment Name";
pub const COLUMN_TYPE: &str = "Type";
pub const COLUMN_FLOWRATE: &str = "Flowrate";
pub const COLUMN_PRESSURE: &str = "Pressure";
pub const COLUMN_TEMPERATURE: &str = "Temperature";

/// 必需列（规范顺序，用于缺列提示）
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COLUMN_EQUIPMENT_NAME,
    COLUMN_TYPE,
    COLUMN_FLOWRATE,
    COLUMN_PRESSURE,
    COLUMN_TEMPERATURE,
];

// ==========================================
// NumericColumn - 数值列
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericColumn {
    Flowrate,
    Pressure,
    Temperature,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 3] = [
        NumericColumn::Flowrate,
        NumericColumn::Pressure,
        NumericColumn::Temperature,
    ];

    /// CSV 列名
    pub fn column_name(&self) -> &'static str {
        match self {
            NumericColumn::Flowrate => COLUMN_FLOWRATE,
            NumericColumn::Pressure => COLUMN_PRESSURE,
            NumericColumn::Temperature => COLUMN_TEMPERATURE,
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ==========================================
// RawEquipmentRow - 原始行（解析后、校验前）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RawEquipmentRow {
    pub row_number: usize,               // 数据行号（从 1 开始，不含表头）
    pub cells: HashMap<String, String>,  // 列名 → 原始字符串（已 TRIM）
}

impl RawEquipmentRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

// ==========================================
// RawTable - 解析后的表格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawEquipmentRow>,
}

// ==========================================
// EquipmentRecord - 设备记录
// ==========================================
// 红线: 创建后不可变，顺序与源文件一致（趋势图按索引取值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl EquipmentRecord {
    pub fn value(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::Flowrate => self.flowrate,
            NumericColumn::Pressure => self.pressure,
            NumericColumn::Temperature => self.temperature,
        }
    }
}
