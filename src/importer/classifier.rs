// ==========================================
// 考勤导入引擎 - 考勤分类器
// ==========================================
// 职责: 打卡时间 + 配置阈值 → 工时 / 加班 / 考勤状态
// 红线: 纯函数, 幂等; 历史口径保留, 见各分支注释
// ==========================================

use crate::config::ImportConfig;
use crate::domain::types::AttendanceStatus;
use chrono::{Duration, NaiveDate, NaiveDateTime};

// ==========================================
// Classification - 分类结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub working_hours: f64,  // 2 位小数, 封顶标准日工时
    pub overtime_hours: f64, // 2 位小数
    pub status: AttendanceStatus,
}

/// 四舍五入到 2 位小数
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 考勤分类
///
/// # 规则
/// 1. 两次打卡齐全: 计算实际工时 (2 位小数), 超出标准日工时的
///    部分记为加班, 工时本身封顶
/// 2. 两次打卡全缺: absent, 工时为 0
/// 3. 两次打卡齐全且总工时低于半天阈值: half_day
/// 4. 有上班打卡: 晚于 (date + 班次开始 + 宽限分钟) 判为 late, 否则 present
/// 5. 兜底: present
///
/// 只有下班打卡的行落入兜底分支 (present, 0 工时), 这是源系统的
/// 历史口径, 刻意保留
pub fn classify(
    date: NaiveDate,
    clock_in: Option<NaiveDateTime>,
    clock_out: Option<NaiveDateTime>,
    config: &ImportConfig,
) -> Classification {
    let mut working_hours = 0.0;
    let mut overtime_hours = 0.0;

    if let (Some(start), Some(end)) = (clock_in, clock_out) {
        // 打卡顺序颠倒 (下班早于上班) 按 0 时长处理, 工时不允许为负
        let elapsed_minutes = (end - start).num_minutes().max(0) as f64;
        let raw_hours = round2(elapsed_minutes / 60.0);
        if raw_hours > config.working_hours_per_day {
            overtime_hours = round2(raw_hours - config.working_hours_per_day);
            working_hours = config.working_hours_per_day;
        } else {
            working_hours = raw_hours;
        }
    }

    let status = if clock_in.is_none() && clock_out.is_none() {
        AttendanceStatus::Absent
    } else if clock_in.is_some()
        && clock_out.is_some()
        && working_hours + overtime_hours < config.half_day_hours
    {
        AttendanceStatus::HalfDay
    } else if let Some(start) = clock_in {
        let shift_start = date.and_time(config.shift_start_time());
        let latest_on_time = shift_start + Duration::minutes(config.late_threshold_minutes);
        if start > latest_on_time {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    } else {
        AttendanceStatus::Present
    };

    Classification {
        working_hours,
        overtime_hours,
        status,
    }
}
