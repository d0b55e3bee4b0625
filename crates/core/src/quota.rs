// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile and account-period quota ledger records.

use crate::id::{LeaderboardId, ProfileId};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// A user account holding compute and model quotas.
///
/// Limits are `None` for unlimited; stores never see a sentinel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub profile_id: ProfileId,
    pub alias: String,
    pub compute_minutes_queued: u32,
    pub compute_minutes_used: u32,
    pub model_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_compute_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_model_count: Option<u32>,
    pub created_at_ms: u64,
}

/// Partial update applied to a profile's quota counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub compute_minutes_queued: Option<u32>,
    pub compute_minutes_used: Option<u32>,
    pub model_count: Option<u32>,
}

impl ProfileUpdate {
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(queued) = self.compute_minutes_queued {
            profile.compute_minutes_queued = queued;
        }
        if let Some(used) = self.compute_minutes_used {
            profile.compute_minutes_used = used;
        }
        if let Some(count) = self.model_count {
            profile.model_count = count;
        }
    }
}

/// Snapshot of the counters that gate admission.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUsage {
    pub compute_minutes_queued: u32,
    pub compute_minutes_used: u32,
    pub model_count: u32,
    pub max_total_compute_minutes: Option<u32>,
    pub max_model_count: Option<u32>,
}

impl From<&Profile> for ProfileUsage {
    fn from(profile: &Profile) -> Self {
        Self {
            compute_minutes_queued: profile.compute_minutes_queued,
            compute_minutes_used: profile.compute_minutes_used,
            model_count: profile.model_count,
            max_total_compute_minutes: profile.max_total_compute_minutes,
            max_model_count: profile.max_model_count,
        }
    }
}

/// Accounting period for account-wide usage rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn from_epoch_ms(epoch_ms: u64) -> Self {
        match chrono::DateTime::from_timestamp_millis(epoch_ms as i64) {
            Some(dt) => Self { year: dt.year(), month: dt.month() },
            None => Self { year: 1970, month: 1 },
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Account-wide compute usage for one (year, month) period.
///
/// Created lazily per period; never reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPeriodUsage {
    pub period: Period,
    pub account_compute_minutes_queued: u32,
    pub account_compute_minutes_used: u32,
}

impl AccountPeriodUsage {
    pub fn empty(period: Period) -> Self {
        Self { period, account_compute_minutes_queued: 0, account_compute_minutes_used: 0 }
    }
}

/// Partial update applied to an account-period usage row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountUsageUpdate {
    pub account_compute_minutes_queued: Option<u32>,
    pub account_compute_minutes_used: Option<u32>,
}

impl AccountUsageUpdate {
    pub fn apply(&self, usage: &mut AccountPeriodUsage) {
        if let Some(queued) = self.account_compute_minutes_queued {
            usage.account_compute_minutes_queued = queued;
        }
        if let Some(used) = self.account_compute_minutes_used {
            usage.account_compute_minutes_used = used;
        }
    }
}

/// A race leaderboard. Only the identity and name matter to this core;
/// rankings live with the wire layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub leaderboard_id: LeaderboardId,
    pub name: String,
    pub created_at_ms: u64,
}

crate::builder! {
    pub struct ProfileBuilder => Profile {
        into {
            profile_id: ProfileId = "prf-test",
            alias: String = "racer-one",
        }
        set {
            compute_minutes_queued: u32 = 0,
            compute_minutes_used: u32 = 0,
            model_count: u32 = 0,
        }
        option {
            max_total_compute_minutes: u32 = None,
            max_model_count: u32 = None,
        }
        computed {
            created_at_ms: u64 = 1_000_000,
        }
    }
}

#[cfg(test)]
#[path = "quota_tests.rs"]
mod tests;
