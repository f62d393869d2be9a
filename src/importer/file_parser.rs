// ==========================================
// 化工设备参数分析系统 - 文件解析器实现
// ==========================================
// 阶段 0: 原始字节 → 表头 + 行记录
// 支持: CSV (.csv)
// ==========================================

use crate::domain::{RawEquipmentRow, RawTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::equipment_importer_trait::FileParser;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

// ==========================================
// CSV Parser 实现
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_table(
        &self,
        file_name: &str,
        raw_bytes: &[u8],
        max_upload_bytes: usize,
    ) -> ImportResult<RawTable> {
        // 检查扩展名
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(file_name.to_string()));
        }

        // 检查大小
        if raw_bytes.len() > max_upload_bytes {
            return Err(ImportError::PayloadTooLarge {
                size: raw_bytes.len(),
                limit: max_upload_bytes,
            });
        }

        let text = std::str::from_utf8(raw_bytes)
            .map_err(|e| ImportError::CsvParseError(format!("文件不是有效的 UTF-8: {}", e)))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致（缺失单元格在校验阶段报错）
            .from_reader(text.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                let h = if idx == 0 { h.trim_start_matches(UTF8_BOM) } else { h };
                h.trim().to_string()
            })
            .collect();

        // 读取所有行（行号按 csv 产出的数据行计；完全空的物理行由 csv 丢弃，不占行号）
        // 单元格全空的行（如 ",,,,"）照常保留，交由校验阶段拒绝
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut cells = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    cells.insert(header.clone(), value.trim().to_string());
                }
            }

            rows.push(RawEquipmentRow {
                row_number: row_idx + 1,
                cells,
            });
        }

        Ok(RawTable { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 5 * 1024 * 1024;

    const VALID_CSV: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                             Pump-1,Pump,120,5.2,110\n\
                             Valve-1,Valve,60,4.1,105\n";

    #[test]
    fn test_csv_parser_valid_bytes() {
        let parser = CsvParser;
        let table = parser
            .parse_to_raw_table("sample.csv", VALID_CSV.as_bytes(), LIMIT)
            .unwrap();

        assert_eq!(table.headers.len(), 5);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].row_number, 1);
        assert_eq!(table.rows[0].get("Equipment Name"), Some("Pump-1"));
        assert_eq!(table.rows[1].get("Pressure"), Some("4.1"));
    }

    #[test]
    fn test_csv_parser_rejects_other_extension() {
        let parser = CsvParser;
        let result = parser.parse_to_raw_table("sample.xlsx", VALID_CSV.as_bytes(), LIMIT);
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_csv_parser_accepts_uppercase_extension() {
        let parser = CsvParser;
        assert!(parser
            .parse_to_raw_table("SAMPLE.CSV", VALID_CSV.as_bytes(), LIMIT)
            .is_ok());
    }

    #[test]
    fn test_csv_parser_rejects_oversized_payload() {
        let parser = CsvParser;
        let result = parser.parse_to_raw_table("sample.csv", VALID_CSV.as_bytes(), 16);
        assert!(matches!(
            result,
            Err(ImportError::PayloadTooLarge { limit: 16, .. })
        ));
    }

    #[test]
    fn test_csv_parser_rejects_invalid_utf8() {
        let parser = CsvParser;
        let result = parser.parse_to_raw_table("sample.csv", &[0xff, 0xfe, 0x00, 0x41], LIMIT);
        assert!(matches!(result, Err(ImportError::CsvParseError(_))));
    }

    #[test]
    fn test_csv_parser_strips_bom_and_whitespace() {
        let parser = CsvParser;
        let csv = "\u{feff}Equipment Name , Type,Flowrate,Pressure,Temperature\n A , B ,1,2,3\n";
        let table = parser.parse_to_raw_table("bom.csv", csv.as_bytes(), LIMIT).unwrap();

        assert_eq!(table.headers[0], "Equipment Name");
        assert_eq!(table.headers[1], "Type");
        assert_eq!(table.rows[0].get("Equipment Name"), Some("A"));
        assert_eq!(table.rows[0].get("Type"), Some("B"));
    }

    #[test]
    fn test_csv_parser_keeps_rows_with_blank_cells() {
        let parser = CsvParser;
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                   Pump-1,Pump,1,2,3\n\
                   ,,,,\n\
                   Pump-2,Pump,4,5,6\n";
        let table = parser.parse_to_raw_table("gap.csv", csv.as_bytes(), LIMIT).unwrap();

        // 全空单元格的行不得被丢弃
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].row_number, 2);
        assert_eq!(table.rows[1].get("Flowrate"), Some(""));
        assert_eq!(table.rows[2].row_number, 3);
    }

    #[test]
    fn test_csv_parser_empty_lines_take_no_row_number() {
        let parser = CsvParser;
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                   Pump-1,Pump,1,2,3\n\
                   \n\
                   Pump-2,Pump,4,5,6\n";
        let table = parser.parse_to_raw_table("gap.csv", csv.as_bytes(), LIMIT).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].row_number, 2);
        assert_eq!(table.rows[1].get("Equipment Name"), Some("Pump-2"));
    }

    #[test]
    fn test_csv_parser_header_only() {
        let parser = CsvParser;
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n";
        let table = parser.parse_to_raw_table("empty.csv", csv.as_bytes(), LIMIT).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.headers.len(), 5);
    }
}
