//! Pure cost and duration tables for the mining economy.
//!
//! Every function here is deterministic and side-effect free. Saved games
//! depend on these curves staying identical across versions, so the
//! constants are part of the persistence contract.

use std::time::Duration;

/// Flat component of the pickaxe and storage upgrade cost curve.
pub const UPGRADE_BASE_COST: u64 = 200;
/// Linear component of the pickaxe and storage upgrade cost curve.
pub const UPGRADE_COST_STEP: u64 = 700;
/// Numerator of the furnace upgrade discount on the shared upgrade curve.
pub const FURNACE_COST_NUMER: u64 = 4;
/// Denominator of the furnace upgrade discount on the shared upgrade curve.
pub const FURNACE_COST_DENOM: u64 = 5;

/// Flat component of the worker hire cost curve.
pub const HIRE_BASE_COST: u64 = 200;
/// Linear component of the worker hire cost curve per existing worker.
pub const HIRE_COST_STEP: u64 = 900;
/// Base cost of the exponential stamina upgrade curve.
pub const STAMINA_BASE_COST: u64 = 5_000;

/// Smelt duration at furnace level one.
pub const BASE_SMELT_DURATION: Duration = Duration::from_millis(2_000);
/// Floor below which smelt duration never drops.
pub const MIN_SMELT_DURATION: Duration = Duration::from_millis(100);
/// Per-level divisor factor applied to the smelt duration above level one.
pub const SMELT_LEVEL_FACTOR: f64 = 0.8;
/// Highest purchasable furnace level.
pub const MAX_FURNACE_LEVEL: u32 = 10;

/// Storage capacity at the base storage level.
pub const BASE_STORAGE_CAP: u32 = 50;
/// Capacity gained per storage level.
pub const STORAGE_CAP_STEP: u32 = 50;
/// Level a fresh storage starts at.
pub const BASE_STORAGE_LEVEL: u32 = 1;
/// Highest purchasable storage level.
pub const MAX_STORAGE_LEVEL: u32 = 5;

/// Click cooldown of an unupgraded pickaxe.
pub const BASE_PICKAXE_COOLDOWN: Duration = Duration::from_millis(800);
/// Divisor applied to the click cooldown per pickaxe level.
pub const PICKAXE_SPEED_DIVISOR: f64 = 1.2;

/// Maximum number of workers that can be hired.
pub const MAX_CREW: usize = 5;
/// Worker mining cooldown as a multiple of the pickaxe click cooldown.
pub const CREW_COOLDOWN_PENALTY: u32 = 2;
/// Minutes of work phase granted per stamina level.
pub const WORK_MINUTES_PER_STAMINA: u64 = 5;
/// Fixed duration of every rest phase.
pub const REST_DURATION: Duration = Duration::from_secs(15 * 60);

/// Percent chance that a broken tile yields a lightning token.
pub const LIGHTNING_DROP_PERCENT: u64 = 5;

/// Coin cost of the next pickaxe or storage level.
#[must_use]
pub fn upgrade_cost(level: u32) -> u64 {
    UPGRADE_BASE_COST + UPGRADE_COST_STEP * u64::from(level)
}

/// Coin cost of the next furnace level; four fifths of the shared curve.
#[must_use]
pub fn furnace_upgrade_cost(level: u32) -> u64 {
    // The shared curve is a multiple of 100, so the fraction divides exactly.
    upgrade_cost(level) * FURNACE_COST_NUMER / FURNACE_COST_DENOM
}

/// Coin cost of hiring one more worker given the current roster size.
#[must_use]
pub fn hire_cost(existing_workers: usize) -> u64 {
    HIRE_BASE_COST + HIRE_COST_STEP * existing_workers as u64
}

/// Coin cost of the next crew stamina level; doubles per level.
#[must_use]
pub fn stamina_upgrade_cost(level: u32) -> u64 {
    STAMINA_BASE_COST.saturating_mul(2u64.saturating_pow(level.saturating_sub(1)))
}

/// Smelt duration at the provided furnace level.
///
/// Level one smelts at the configured base duration; higher levels divide
/// it by `level * SMELT_LEVEL_FACTOR`, clamped to [`MIN_SMELT_DURATION`].
#[must_use]
pub fn smelt_duration(level: u32) -> Duration {
    if level <= 1 {
        return BASE_SMELT_DURATION;
    }
    let scaled = BASE_SMELT_DURATION.as_secs_f64() / (f64::from(level) * SMELT_LEVEL_FACTOR);
    Duration::from_secs_f64(scaled.max(MIN_SMELT_DURATION.as_secs_f64()))
}

/// Click cooldown of the pickaxe at the provided level.
#[must_use]
pub fn pickaxe_cooldown(level: u32) -> Duration {
    let divisor = PICKAXE_SPEED_DIVISOR.powi(level.min(1_000) as i32);
    Duration::from_secs_f64(BASE_PICKAXE_COOLDOWN.as_secs_f64() / divisor)
}

/// Mining cooldown of a hired worker at the provided pickaxe level.
#[must_use]
pub fn crew_cooldown(pickaxe_level: u32) -> Duration {
    pickaxe_cooldown(pickaxe_level) * CREW_COOLDOWN_PENALTY
}

/// Raw ore storage capacity at the provided storage level.
#[must_use]
pub fn storage_cap(level: u32) -> u32 {
    BASE_STORAGE_CAP
        .saturating_add(STORAGE_CAP_STEP.saturating_mul(level.saturating_sub(BASE_STORAGE_LEVEL)))
}

/// Duration of a work phase at the provided stamina level.
#[must_use]
pub fn work_duration(stamina_level: u32) -> Duration {
    Duration::from_secs(u64::from(stamina_level.max(1)) * WORK_MINUTES_PER_STAMINA * 60)
}
