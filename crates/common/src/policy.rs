//! Submission limit policy

use chrono::{DateTime, Months, Utc};

/// How many accepted submissions a client may make inside a rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    /// Window length in calendar months
    pub window_months: u32,

    /// Submissions allowed inside the window
    pub max_submissions: usize,
}

impl LimitPolicy {
    /// One calendar year, five submissions
    pub const DEFAULT: LimitPolicy = LimitPolicy {
        window_months: 12,
        max_submissions: 5,
    };

    /// Oldest instant still outside the window. Timestamps must be strictly
    /// newer than this to count.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.window_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn allows(&self, recent_count: usize) -> bool {
        recent_count < self.max_submissions
    }

    /// Message shown to a client that has exhausted its quota
    pub fn rate_limit_message(&self, count: usize) -> String {
        format!(
            "{} 동안 최대 {}회까지만 설문 조사에 참여할 수 있습니다. 현재 {}회 참여했습니다.",
            self.window_label(),
            self.max_submissions,
            count
        )
    }

    fn window_label(&self) -> String {
        if self.window_months % 12 == 0 {
            format!("{}년", self.window_months / 12)
        } else {
            format!("{}개월", self.window_months)
        }
    }
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
