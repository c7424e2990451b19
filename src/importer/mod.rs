// ==========================================
// 考勤导入引擎 - 导入层
// ==========================================
// 职责: 外部考勤表数据导入, 生成考勤事实
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod attendance_importer_impl;
pub mod attendance_importer_trait;
pub mod cell;
pub mod classifier;
pub mod datetime_parser;
pub mod employee_resolver;
pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use attendance_importer_impl::AttendanceImporterImpl;
pub use attendance_importer_trait::AttendanceImporter;
pub use cell::{normalize_cell, CellValue, RawRow};
pub use classifier::{classify, Classification};
pub use datetime_parser::{parse_date, parse_date_time};
pub use employee_resolver::EmployeeResolver;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
