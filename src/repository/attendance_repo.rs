// ==========================================
// 考勤导入引擎 - 数据访问 Trait
// ==========================================
// 职责: 定义导入管道所需的两个外部协作方接口
//       (员工库查找 + 考勤事实持久化)
// 红线: Repository 不含业务规则, 只做数据 CRUD
// ==========================================

use crate::domain::attendance::{AttendanceFact, Employee, ImportBatch};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// EmployeeStore Trait
// ==========================================
// 用途: 员工标识 → 规范员工记录
// 实现者: AttendanceImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// 按主键查找员工
    ///
    /// # 返回
    /// - Ok(Some(employee)): 找到
    /// - Ok(None): 不存在 (不是错误, 由调用方决定如何处理)
    /// - Err: 员工库不可达
    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, Box<dyn Error>>;

    /// 按邮箱精确查找员工
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, Box<dyn Error>>;
}

// ==========================================
// AttendanceImportRepository Trait
// ==========================================
// 用途: 考勤事实与批次审计的数据访问
// 实现者: AttendanceImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait AttendanceImportRepository: Send + Sync {
    /// 幂等 upsert 一条考勤事实
    ///
    /// # 语义
    /// - 键: (employee_id, date)
    /// - 已存在则整行覆盖 (后写者胜), 不产生重复行
    async fn upsert_attendance(&self, fact: &AttendanceFact) -> Result<(), Box<dyn Error>>;

    /// 插入导入批次审计记录
    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error>>;

    /// 查询最近的导入批次
    ///
    /// # 参数
    /// - limit: 返回记录数限制
    async fn get_recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, Box<dyn Error>>;

    /// 统计考勤事实行数 (测试与巡检用)
    async fn count_facts(&self) -> Result<usize, Box<dyn Error>>;

    /// 按键读取单条考勤事实
    async fn get_fact(
        &self,
        employee_id: u64,
        date: chrono::NaiveDate,
    ) -> Result<Option<AttendanceFact>, Box<dyn Error>>;
}
