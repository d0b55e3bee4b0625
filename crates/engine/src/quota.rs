// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quota accounting: admission checks, reservation, finalization, reset.
//!
//! Only this module writes quota counters. Reservation happens at
//! admission; finalization converts the reservation into actual
//! consumption once external execution ends.

use crate::error::EngineError;
use crate::Services;
use futures_util::future::join_all;
use pw_core::{AccountUsageUpdate, Clock, Period, ProfileId, ProfileUpdate, ProfileUsage};
use pw_store::{AccountUsageStore, ProfileStore, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Concurrent profile updates per chunk during the monthly reset.
    pub reset_fan_out: usize,
    /// Profiles fetched per page during the monthly reset.
    pub reset_page_size: usize,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { reset_fan_out: 10, reset_page_size: DEFAULT_PAGE_SIZE }
    }
}

/// Loads, reserves and reconciles compute-minute quotas at profile and
/// account-period level.
#[derive(Clone)]
pub struct QuotaHelper {
    services: Services,
    config: QuotaConfig,
}

impl QuotaHelper {
    pub fn new(services: Services) -> Self {
        Self::with_config(services, QuotaConfig::default())
    }

    pub fn with_config(services: Services, config: QuotaConfig) -> Self {
        Self { services, config }
    }

    pub async fn load_profile_usage(
        &self,
        profile_id: &ProfileId,
    ) -> Result<ProfileUsage, EngineError> {
        let profile = self.services.profiles.load(profile_id).await?;
        Ok(ProfileUsage::from(&profile))
    }

    /// Admission gate. A `None` limit is unlimited.
    pub fn check_admission(
        usage: &ProfileUsage,
        requested_minutes: u32,
        check_model_count: bool,
    ) -> Result<(), EngineError> {
        if let Some(max) = usage.max_total_compute_minutes {
            let requested_total =
                usage.compute_minutes_used + usage.compute_minutes_queued + requested_minutes;
            if requested_total > max {
                return Err(EngineError::QuotaExceeded(
                    "total compute minutes for the month exceeded".to_string(),
                ));
            }
        }
        if check_model_count {
            if let Some(max) = usage.max_model_count {
                if usage.model_count >= max {
                    return Err(EngineError::QuotaExceeded(
                        "total number of models for the month exceeded".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Reserve minutes at profile and account-period level. Part of the
    /// same logical operation as job/model creation; the caller must
    /// compensate if record creation fails after this succeeds.
    pub async fn reserve(
        &self,
        profile_id: &ProfileId,
        minutes: u32,
        new_model: bool,
    ) -> Result<(), EngineError> {
        let period = Period::from_epoch_ms(self.services.clock.epoch_ms());
        let (profile, account) = tokio::try_join!(
            self.services.profiles.load(profile_id),
            self.services.account_usage.get_or_create(period),
        )?;

        let profile_update = ProfileUpdate {
            compute_minutes_queued: Some(profile.compute_minutes_queued + minutes),
            model_count: new_model.then(|| profile.model_count + 1),
            ..ProfileUpdate::default()
        };
        let account_update = AccountUsageUpdate {
            account_compute_minutes_queued: Some(account.account_compute_minutes_queued + minutes),
            ..AccountUsageUpdate::default()
        };

        tokio::try_join!(
            self.services.profiles.update(profile_id, profile_update),
            self.services.account_usage.update(period, account_update),
        )?;
        Ok(())
    }

    /// Reconcile a reservation once execution ends: the account period
    /// first, then the profile. The user is never charged for more than
    /// was reserved, and never credited beyond what was actually consumed.
    pub async fn finalize(
        &self,
        profile_id: &ProfileId,
        minutes_queued_by_user: u32,
        minutes_used_externally: u32,
    ) -> Result<(), EngineError> {
        let period = Period::from_epoch_ms(self.services.clock.epoch_ms());
        self.finalize_account(period, minutes_queued_by_user, minutes_used_externally).await?;
        self.finalize_profile(profile_id, minutes_queued_by_user, minutes_used_externally).await
    }

    pub async fn finalize_profile(
        &self,
        profile_id: &ProfileId,
        minutes_queued_by_user: u32,
        minutes_used_externally: u32,
    ) -> Result<(), EngineError> {
        let profile = self.services.profiles.load(profile_id).await?;
        let queued = profile.compute_minutes_queued.saturating_sub(minutes_queued_by_user);
        let used = profile.compute_minutes_used
            + minutes_queued_by_user.min(minutes_used_externally);
        self.services
            .profiles
            .update(
                profile_id,
                ProfileUpdate {
                    compute_minutes_queued: Some(queued),
                    compute_minutes_used: Some(used),
                    ..ProfileUpdate::default()
                },
            )
            .await?;
        Ok(())
    }

    /// Mirror of [`finalize_profile`] for the account period. A missing
    /// period row means nothing was reserved this period; skip.
    pub async fn finalize_account(
        &self,
        period: Period,
        minutes_queued_by_user: u32,
        minutes_used_externally: u32,
    ) -> Result<(), EngineError> {
        let Some(account) = self.services.account_usage.get(period).await? else {
            return Ok(());
        };
        let queued =
            account.account_compute_minutes_queued.saturating_sub(minutes_queued_by_user);
        let used = account.account_compute_minutes_used
            + minutes_queued_by_user.min(minutes_used_externally);
        self.services
            .account_usage
            .update(
                period,
                AccountUsageUpdate {
                    account_compute_minutes_queued: Some(queued),
                    account_compute_minutes_used: Some(used),
                },
            )
            .await?;
        Ok(())
    }

    /// Zero every profile's used minutes and model count, page by page.
    /// Queued minutes are untouched: they belong to jobs still in flight.
    /// Returns the number of profiles processed.
    pub async fn reset_monthly(&self, batch_size: Option<usize>) -> Result<u64, EngineError> {
        let page_size = batch_size.unwrap_or(self.config.reset_page_size);
        let mut cursor: Option<String> = None;
        let mut total: u64 = 0;
        let mut batch_number = 0u32;

        loop {
            batch_number += 1;
            let page = self.services.profiles.list(cursor.take(), page_size).await?;
            tracing::debug!(
                batch = batch_number,
                profiles = page.items.len(),
                has_more = page.cursor.is_some(),
                "retrieved profile batch for quota reset"
            );

            for chunk in page.items.chunks(self.config.reset_fan_out) {
                let results = join_all(chunk.iter().map(|profile| {
                    self.services.profiles.update(
                        &profile.profile_id,
                        ProfileUpdate {
                            compute_minutes_used: Some(0),
                            model_count: Some(0),
                            ..ProfileUpdate::default()
                        },
                    )
                }))
                .await;
                for result in results {
                    result?;
                }
            }

            total += page.items.len() as u64;
            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(profiles = total, batches = batch_number, "monthly quota reset completed");
        Ok(total)
    }
}

#[cfg(test)]
#[path = "quota_tests.rs"]
mod tests;
