use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};

// ============================================================================
// 时间戳和序列号提供者
// ============================================================================

/// 时间戳提供者 trait
///
/// 追踪器通过它获取变更时间，测试中替换为固定时钟。
pub trait TimestampProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 默认时间戳提供者（使用系统时间）
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimestampProvider;

impl TimestampProvider for SystemTimestampProvider {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定时间戳提供者，可手动推进
///
/// 以毫秒（可为负，即 1970 年以前）保存当前时间。
#[derive(Debug)]
pub struct FixedTimestampProvider {
    millis: AtomicI64,
}

impl FixedTimestampProvider {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { millis: AtomicI64::new(instant.timestamp_millis()) }
    }

    /// 将时钟设置到指定时间
    pub fn set(&self, instant: DateTime<Utc>) {
        self.millis.store(instant.timestamp_millis(), Ordering::Release);
    }

    /// 时钟前进指定秒数
    pub fn advance_secs(&self, secs: i64) {
        let delta = secs.saturating_mul(1_000);
        // fetch_update 的闭包总是返回 Some，结果可以忽略
        let _ = self.millis.fetch_update(Ordering::AcqRel, Ordering::Acquire, |millis| {
            Some(millis.saturating_add(delta))
        });
    }
}

impl TimestampProvider for FixedTimestampProvider {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::Acquire);
        DateTime::from_timestamp_millis(millis).unwrap_or(if millis < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }
}

/// 序列号生成器 trait
pub trait SequenceGenerator: Send + Sync {
    /// 生成下一个序列号
    fn next(&self) -> u64;
}

/// 原子递增序列号生成器（线程安全）
///
/// 变更日志用它为同一时间戳内的记录保留写入顺序。
#[derive(Debug, Default)]
pub struct AtomicSequenceGenerator {
    counter: AtomicU64,
}

impl AtomicSequenceGenerator {
    #[inline]
    pub fn new() -> Self {
        Self { counter: AtomicU64::new(0) }
    }

    /// 从指定值开始
    #[inline]
    pub fn with_start(start: u64) -> Self {
        Self { counter: AtomicU64::new(start) }
    }

    /// 一次预留 `count` 个连续序列号，返回第一个
    #[inline]
    pub fn next_batch(&self, count: u64) -> u64 {
        self.counter.fetch_add(count, Ordering::Relaxed)
    }
}

impl SequenceGenerator for AtomicSequenceGenerator {
    #[inline]
    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}
