// ==========================================
// 化工设备参数分析系统 - 结构校验器实现
// ==========================================
// 阶段 1: 表头必需列校验 + 数值列类型校验
// 策略: 严格全有或全无（首个错误行即拒绝，不静默丢行）
// ==========================================

use crate::domain::equipment::{COLUMN_EQUIPMENT_NAME, COLUMN_TYPE};
use crate::domain::{EquipmentRecord, NumericColumn, RawEquipmentRow, REQUIRED_COLUMNS};
use crate::importer::equipment_importer_trait::SchemaValidator as SchemaValidatorTrait;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashSet;

pub struct SchemaValidator;

impl SchemaValidator {
    /// 解析有限数值（拒绝 NaN / inf / 空值）
    fn parse_finite(
        &self,
        row: &RawEquipmentRow,
        column: NumericColumn,
    ) -> ImportResult<f64> {
        let raw = row.get(column.column_name()).unwrap_or("");
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ImportError::RowError {
                row_index: row.row_number,
                column: column.column_name().to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

impl SchemaValidatorTrait for SchemaValidator {
    fn validate_headers(&self, headers: &[String]) -> ImportResult<()> {
        let present: HashSet<&str> = headers.iter().map(String::as_str).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !present.contains(*c))
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::SchemaError { missing })
        }
    }

    fn parse_row(&self, row: &RawEquipmentRow) -> ImportResult<EquipmentRecord> {
        Ok(EquipmentRecord {
            name: row.get(COLUMN_EQUIPMENT_NAME).unwrap_or("").to_string(),
            equipment_type: row.get(COLUMN_TYPE).unwrap_or("").to_string(),
            flowrate: self.parse_finite(row, NumericColumn::Flowrate)?,
            pressure: self.parse_finite(row, NumericColumn::Pressure)?,
            temperature: self.parse_finite(row, NumericColumn::Temperature)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawTable;
    use std::collections::HashMap;

    fn headers() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn create_test_row(row_number: usize, flowrate: &str, pressure: &str, temp: &str) -> RawEquipmentRow {
        let mut cells = HashMap::new();
        cells.insert("Equipment Name".to_string(), format!("EQ-{}", row_number));
        cells.insert("Type".to_string(), "Pump".to_string());
        cells.insert("Flowrate".to_string(), flowrate.to_string());
        cells.insert("Pressure".to_string(), pressure.to_string());
        cells.insert("Temperature".to_string(), temp.to_string());
        RawEquipmentRow { row_number, cells }
    }

    #[test]
    fn test_validate_headers_ok_any_order_with_extra() {
        let validator = SchemaValidator;
        let mut h = headers();
        h.reverse();
        h.push("Notes".to_string());
        assert!(validator.validate_headers(&h).is_ok());
    }

    #[test]
    fn test_validate_headers_missing_pressure() {
        let validator = SchemaValidator;
        let h: Vec<String> = headers().into_iter().filter(|c| c != "Pressure").collect();

        match validator.validate_headers(&h) {
            Err(ImportError::SchemaError { missing }) => assert_eq!(missing, vec!["Pressure"]),
            other => panic!("expected SchemaError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_headers_case_sensitive() {
        let validator = SchemaValidator;
        let h: Vec<String> = headers()
            .into_iter()
            .map(|c| if c == "Type" { "type".to_string() } else { c })
            .collect();

        assert!(matches!(
            validator.validate_headers(&h),
            Err(ImportError::SchemaError { .. })
        ));
    }

    #[test]
    fn test_parse_row_valid() {
        let validator = SchemaValidator;
        let record = validator
            .parse_row(&create_test_row(1, "10.5", "-2", "1e2"))
            .unwrap();

        assert_eq!(record.name, "EQ-1");
        assert_eq!(record.flowrate, 10.5);
        assert_eq!(record.pressure, -2.0);
        assert_eq!(record.temperature, 100.0);
    }

    #[test]
    fn test_parse_row_rejects_non_finite() {
        let validator = SchemaValidator;
        for bad in ["NaN", "inf", "-infinity", "", "12a"] {
            let result = validator.parse_row(&create_test_row(2, "1", bad, "3"));
            match result {
                Err(ImportError::RowError { row_index, column, .. }) => {
                    assert_eq!(row_index, 2);
                    assert_eq!(column, "Pressure");
                }
                other => panic!("expected RowError for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_validate_stops_at_first_bad_row() {
        let validator = SchemaValidator;
        let table = RawTable {
            headers: headers(),
            rows: vec![
                create_test_row(1, "1", "1", "1"),
                create_test_row(2, "2", "2", "2"),
                create_test_row(3, "abc", "3", "3"),
                create_test_row(4, "4", "x", "4"),
            ],
        };

        match validator.validate(&table) {
            Err(ImportError::RowError { row_index, column, value }) => {
                assert_eq!(row_index, 3);
                assert_eq!(column, "Flowrate");
                assert_eq!(value, "abc");
            }
            other => panic!("expected RowError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_empty_table() {
        let validator = SchemaValidator;
        let table = RawTable {
            headers: headers(),
            rows: vec![],
        };
        assert!(matches!(
            validator.validate(&table),
            Err(ImportError::EmptyDatasetError)
        ));
    }

    #[test]
    fn test_validate_schema_checked_before_rows() {
        let validator = SchemaValidator;
        let table = RawTable {
            headers: vec!["Equipment Name".to_string()],
            rows: vec![],
        };
        match validator.validate(&table) {
            Err(ImportError::SchemaError { missing }) => {
                assert_eq!(missing, vec!["Type", "Flowrate", "Pressure", "Temperature"]);
            }
            other => panic!("expected SchemaError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_preserves_order() {
        let validator = SchemaValidator;
        let table = RawTable {
            headers: headers(),
            rows: (1..=4).map(|i| create_test_row(i, &i.to_string(), "1", "1")).collect(),
        };
        let records = validator.validate(&table).unwrap();
        let flows: Vec<f64> = records.iter().map(|r| r.flowrate).collect();
        assert_eq!(flows, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
