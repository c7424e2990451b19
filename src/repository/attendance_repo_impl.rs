// ==========================================
// 考勤导入引擎 - 数据访问实现
// ==========================================
// 职责: 员工查找与考勤事实持久化（使用 rusqlite）
// 红线: Repository 不含业务规则, 只做数据 CRUD;
//       upsert 以 (employee_id, date) 为冲突键整行覆盖
// ==========================================

use crate::db;
use crate::domain::attendance::{AttendanceFact, Employee, ImportBatch};
use crate::domain::types::{AttendanceSource, AttendanceStatus};
use crate::repository::attendance_repo::{AttendanceImportRepository, EmployeeStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 数据库文本 → 考勤状态 (未知值回退 present, 与历史数据兼容)
fn parse_status(raw: &str) -> AttendanceStatus {
    match raw.trim() {
        "absent" => AttendanceStatus::Absent,
        "late" => AttendanceStatus::Late,
        "half_day" => AttendanceStatus::HalfDay,
        _ => AttendanceStatus::Present,
    }
}

fn parse_source(raw: &str) -> AttendanceSource {
    match raw.trim() {
        "manual" => AttendanceSource::Manual,
        _ => AttendanceSource::Imported,
    }
}

// ==========================================
// AttendanceImportRepositoryImpl
// ==========================================
pub struct AttendanceImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl AttendanceImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// 打开连接并初始化 schema; 连接级故障在这里即失败,
    /// 不会漏到逐行导入阶段
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = db::open_sqlite_connection(db_path)?;
        db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 基于已打开连接创建 (测试用)
    pub fn from_connection(conn: Connection) -> Result<Self, Box<dyn Error>> {
        db::configure_sqlite_connection(&conn)?;
        db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn map_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
        Ok(Employee {
            id: row.get(0)?,
            email: row.get(1)?,
            full_name: row.get(2)?,
        })
    }

    fn map_fact(row: &Row<'_>) -> rusqlite::Result<AttendanceFact> {
        let status: String = row.get(6)?;
        let source: String = row.get(7)?;
        Ok(AttendanceFact {
            employee_id: row.get(0)?,
            date: row.get(1)?,
            clock_in: row.get(2)?,
            clock_out: row.get(3)?,
            working_hours: row.get(4)?,
            overtime_hours: row.get(5)?,
            status: parse_status(&status),
            source: parse_source(&source),
            batch_id: row.get(8)?,
            uploaded_by: row.get(9)?,
        })
    }
}

#[async_trait]
impl EmployeeStore for AttendanceImportRepositoryImpl {
    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let employee = conn
            .query_row(
                "SELECT id, email, full_name FROM employee WHERE id = ?1",
                params![id],
                Self::map_employee,
            )
            .optional()?;
        Ok(employee)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let employee = conn
            .query_row(
                "SELECT id, email, full_name FROM employee WHERE email = ?1",
                params![email],
                Self::map_employee,
            )
            .optional()?;
        Ok(employee)
    }
}

#[async_trait]
impl AttendanceImportRepository for AttendanceImportRepositoryImpl {
    /// 幂等 upsert, 冲突键 (employee_id, date), 后写者胜
    async fn upsert_attendance(&self, fact: &AttendanceFact) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO attendance_fact (
                employee_id, date, clock_in, clock_out,
                working_hours, overtime_hours, status, source,
                batch_id, uploaded_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(employee_id, date) DO UPDATE SET
                clock_in = excluded.clock_in,
                clock_out = excluded.clock_out,
                working_hours = excluded.working_hours,
                overtime_hours = excluded.overtime_hours,
                status = excluded.status,
                source = excluded.source,
                batch_id = excluded.batch_id,
                uploaded_by = excluded.uploaded_by
            "#,
            params![
                fact.employee_id,
                fact.date,
                fact.clock_in,
                fact.clock_out,
                fact.working_hours,
                fact.overtime_hours,
                fact.status.as_str(),
                fact.source.as_str(),
                fact.batch_id,
                fact.uploaded_by,
            ],
        )?;
        Ok(())
    }

    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, total_rows, imported_rows, skipped_rows,
                imported_by, imported_at, elapsed_ms, error_report_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.total_rows,
                batch.imported_rows,
                batch.skipped_rows,
                batch.imported_by,
                batch.imported_at.to_rfc3339(),
                batch.elapsed_ms,
                batch.error_report_json,
            ],
        )?;
        Ok(())
    }

    async fn get_recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, file_name, total_rows, imported_rows, skipped_rows,
                   imported_by, imported_at, elapsed_ms, error_report_json
            FROM import_batch
            ORDER BY imported_at DESC
            LIMIT ?1
            "#,
        )?;
        let batches = stmt
            .query_map(params![limit as i64], |row| {
                let imported_at: String = row.get(6)?;
                Ok(ImportBatch {
                    batch_id: row.get(0)?,
                    file_name: row.get(1)?,
                    total_rows: row.get(2)?,
                    imported_rows: row.get(3)?,
                    skipped_rows: row.get(4)?,
                    imported_by: row.get(5)?,
                    // 审计时间戳解析失败即报错, 不得用当前时间顶替
                    imported_at: DateTime::parse_from_rfc3339(&imported_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                6,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?,
                    elapsed_ms: row.get(7)?,
                    error_report_json: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    async fn count_facts(&self) -> Result<usize, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM attendance_fact", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    async fn get_fact(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceFact>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let fact = conn
            .query_row(
                r#"
                SELECT employee_id, date, clock_in, clock_out,
                       working_hours, overtime_hours, status, source,
                       batch_id, uploaded_by
                FROM attendance_fact
                WHERE employee_id = ?1 AND date = ?2
                "#,
                params![employee_id, date],
                Self::map_fact,
            )
            .optional()?;
        Ok(fact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AttendanceSource, AttendanceStatus};

    fn seeded_repo() -> AttendanceImportRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        let repo = AttendanceImportRepositoryImpl::from_connection(conn).unwrap();
        {
            let conn = repo.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO employee (id, email, full_name) VALUES (5, 'zhang.wei@example.com', '张伟')",
                [],
            )
            .unwrap();
        }
        repo
    }

    fn sample_fact(batch_id: &str, working_hours: f64) -> AttendanceFact {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        AttendanceFact {
            employee_id: 5,
            date,
            clock_in: date.and_hms_opt(9, 5, 0),
            clock_out: date.and_hms_opt(18, 5, 0),
            working_hours,
            overtime_hours: 0.0,
            status: AttendanceStatus::Present,
            source: AttendanceSource::Imported,
            batch_id: batch_id.to_string(),
            uploaded_by: Some(1),
        }
    }

    #[tokio::test]
    async fn test_find_employee_by_id_and_email() {
        let repo = seeded_repo();
        let by_id = repo.find_by_id(5).await.unwrap().unwrap();
        assert_eq!(by_id.email, "zhang.wei@example.com");

        let by_email = repo
            .find_by_email("zhang.wei@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, 5);

        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_without_duplicates() {
        let repo = seeded_repo();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        repo.upsert_attendance(&sample_fact("b1", 8.0)).await.unwrap();
        repo.upsert_attendance(&sample_fact("b2", 7.5)).await.unwrap();

        assert_eq!(repo.count_facts().await.unwrap(), 1);

        let fact = repo.get_fact(5, date).await.unwrap().unwrap();
        // 后写者胜
        assert_eq!(fact.batch_id, "b2");
        assert_eq!(fact.working_hours, 7.5);
    }

    #[tokio::test]
    async fn test_corrupt_batch_timestamp_is_an_error() {
        let repo = seeded_repo();
        {
            let conn = repo.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO import_batch (batch_id, total_rows, imported_rows, skipped_rows, imported_at, elapsed_ms) \
                 VALUES ('batch-bad', 1, 1, 0, '不是时间戳', 3)",
                [],
            )
            .unwrap();
        }

        // 损坏的审计时间戳必须报错, 不得伪造为当前时间
        assert!(repo.get_recent_batches(5).await.is_err());
    }

    #[tokio::test]
    async fn test_insert_and_list_batches() {
        let repo = seeded_repo();
        let batch = ImportBatch {
            batch_id: "batch-1".to_string(),
            file_name: Some("march.csv".to_string()),
            total_rows: 10,
            imported_rows: 8,
            skipped_rows: 2,
            imported_by: Some(1),
            imported_at: Utc::now(),
            elapsed_ms: 12,
            error_report_json: None,
        };
        repo.insert_batch(batch).await.unwrap();

        let recent = repo.get_recent_batches(5).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].batch_id, "batch-1");
        assert_eq!(recent[0].imported_rows, 8);
    }
}
