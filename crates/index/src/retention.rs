//! Pruning of stale requests and eviction of cold groups.
//!
//! Expiry and idleness are independent: a sweep refreshes `is_expired` on
//! every group but only idleness removes a group.

use jiff::Timestamp;

use crate::Index;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub groups_retained: usize,
    pub groups_evicted: usize,
    pub groups_expired: usize,
    pub requests_pruned: usize,
}

impl Index {
    pub fn sweep(&mut self, now: Timestamp) -> SweepReport {
        let cutoff = now.checked_sub(self.settings.retention()).unwrap_or(Timestamp::MIN);
        let mut report = SweepReport::default();

        self.snapshot.token_groups.retain_mut(|group| {
            group.refresh_expiry(now);
            report.requests_pruned += group.prune_requests(cutoff);

            if group.is_idle(cutoff) {
                log::debug!("Evicting idle token group {}", group.identity);
                report.groups_evicted += 1;
                return false;
            }

            report.groups_retained += 1;
            report.groups_expired += usize::from(group.is_expired);
            true
        });

        report
    }
}
