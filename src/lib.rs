// ==========================================
// 建筑工程项目管理系统 - 考勤导入引擎核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 考勤表批量导入与薪资派生的数据底座
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AttendanceSource, AttendanceStatus};

// 领域实体
pub use domain::{AttendanceFact, Employee, ImportBatch, ImportRunResult, RowError};

// 配置
pub use config::{ExcelColumnMap, ImportConfig};

// 导入管道
pub use importer::{
    AttendanceImporter, AttendanceImporterImpl, CellValue, CsvParser, ExcelParser, FileParser,
    ImportError, UniversalFileParser,
};

// 仓储
pub use repository::{
    AttendanceImportRepository, AttendanceImportRepositoryImpl, EmployeeStore,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "考勤导入引擎";
