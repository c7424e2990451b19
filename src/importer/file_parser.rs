// ==========================================
// 考勤导入引擎 - 文件解析器实现
// ==========================================
// 职责: 文件 → 原始行记录 (表头名 → 单元格值)
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 红线: 表头行在此消费, 数据行一律透传 (含空白行),
//       行号语义由编排器统一掌握
// ==========================================

use crate::importer::cell::{CellValue, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 行来源协作方接口 (阶段 0)
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 数据行列表, 顺序与源文件一致
    /// - Err: 文件读取或整体解析错误 (批次级)
    fn parse_to_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        let path = file_path;

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row: RawRow = RawRow::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    // CSV 单元格始终是文本; 数值语义由解析器处理
                    row.insert(header.clone(), CellValue::Text(value.to_string()));
                }
            }

            rows.push(row);
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// calamine 单元格 → CellValue (保留数值形态, 日期取序列数)
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_to_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        let path = file_path;

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)?;

        // 只读第一个 sheet (多 sheet 工作簿不在支持范围)
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError(
                "Excel 文件无工作表".to_string(),
            ));
        }

        let sheet_name = sheet_names[0].clone();
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for data_row in sheet_rows {
            let mut row: RawRow = RawRow::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), Self::convert_cell(cell));
                }
            }

            rows.push(row);
        }

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_rows(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_rows(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_fixture(content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let temp_file = csv_fixture(
            "employee_id,date,clock_in,clock_out\n5,2024-03-01,09:05,18:05\n6,2024-03-01,09:00,17:00\n",
        );

        let rows = CsvParser.parse_to_rows(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("employee_id"),
            Some(&CellValue::Text("5".to_string()))
        );
        assert_eq!(
            rows[0].get("clock_in"),
            Some(&CellValue::Text("09:05".to_string()))
        );
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_keeps_blank_rows() {
        // 空白行透传, 保证下游行号与源文件一致
        let temp_file = csv_fixture(
            "employee_id,date,clock_in,clock_out\n5,2024-03-01,09:05,18:05\n,,,\n6,2024-03-01,09:00,17:00\n",
        );

        let rows = CsvParser.parse_to_rows(temp_file.path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1].get("employee_id"),
            Some(&CellValue::Text("".to_string()))
        );
    }

    #[test]
    fn test_csv_parser_trims_headers() {
        let temp_file = csv_fixture("employee_id , date\n5,2024-03-01\n");
        let rows = CsvParser.parse_to_rows(temp_file.path()).unwrap();
        assert!(rows[0].contains_key("employee_id"));
        assert!(rows[0].contains_key("date"));
    }

    #[test]
    fn test_universal_parser_unsupported_extension() {
        let result = UniversalFileParser.parse_to_rows(Path::new("data.txt"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
