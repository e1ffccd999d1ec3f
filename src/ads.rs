//! Rewarded ad collaborator
//!
//! The core never waits on an ad itself. It exposes a pending state
//! (revive offer, unclaimed reward doubling) and the host reports back with
//! an [`AdResult`] once the ad network is done.

use serde::{Deserialize, Serialize};

/// What a rewarded ad is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdKind {
    Revive,
    DoubleReward,
}

/// Completion report from the ad network. A decline is `success: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdResult {
    pub success: bool,
}

impl AdResult {
    pub const DECLINED: AdResult = AdResult { success: false };
    pub const COMPLETED: AdResult = AdResult { success: true };
}

/// Host-side ad provider
pub trait RewardedAds {
    /// Show an ad and report how it went
    fn show_rewarded_ad(&mut self, kind: AdKind) -> AdResult;
}

/// Provider for builds without an ad network; every offer is declined
#[derive(Debug, Default)]
pub struct NoAds;

impl RewardedAds for NoAds {
    fn show_rewarded_ad(&mut self, kind: AdKind) -> AdResult {
        log::info!("No ad provider, declining {kind:?}");
        AdResult::DECLINED
    }
}
