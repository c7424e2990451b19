// ==========================================
// 考勤导入引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout, 减少并发写入时的偶发 busy 错误
// - 集中建表语句, 保证 (employee_id, date) 唯一约束始终存在
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化考勤导入相关表
///
/// 幂等: 全部 CREATE TABLE IF NOT EXISTS
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS employee (
            id          INTEGER PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            full_name   TEXT
        );

        -- 考勤事实: (employee_id, date) 唯一, upsert 的幂等基础
        CREATE TABLE IF NOT EXISTS attendance_fact (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id    INTEGER NOT NULL REFERENCES employee(id),
            date           TEXT NOT NULL,
            clock_in       TEXT,
            clock_out      TEXT,
            working_hours  REAL NOT NULL DEFAULT 0,
            overtime_hours REAL NOT NULL DEFAULT 0,
            status         TEXT NOT NULL,
            source         TEXT NOT NULL DEFAULT 'imported',
            batch_id       TEXT NOT NULL,
            uploaded_by    INTEGER,
            UNIQUE(employee_id, date)
        );

        -- 导入批次审计
        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id          TEXT PRIMARY KEY,
            file_name         TEXT,
            total_rows        INTEGER NOT NULL,
            imported_rows     INTEGER NOT NULL,
            skipped_rows      INTEGER NOT NULL,
            imported_by       INTEGER,
            imported_at       TEXT NOT NULL,
            elapsed_ms        INTEGER NOT NULL,
            error_report_json TEXT
        );
        "#,
    )
}
