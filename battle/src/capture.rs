//! Capture resolution
//!
//! The chance of catching a wild creature is the product of six factors
//! (base rate by level, missing health, status bonus, device effectiveness,
//! rarity penalty, player level bonus) and an environment modifier, clamped
//! to [`MIN_CAPTURE_CHANCE`, `MAX_CAPTURE_CHANCE`]. A single uniform draw
//! below that chance is a success.

use rand::Rng;

use crate::items::CaptureDevice;
use crate::types::{Creature, StatusKind};

/// Capture is never impossible
pub const MIN_CAPTURE_CHANCE: f64 = 0.01;
/// Capture is never guaranteed
pub const MAX_CAPTURE_CHANCE: f64 = 0.95;

/// Clamp a probability into the capture range. NaN maps to the minimum.
pub fn clamp_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        MIN_CAPTURE_CHANCE
    } else {
        chance.clamp(MIN_CAPTURE_CHANCE, MAX_CAPTURE_CHANCE)
    }
}

/// Individual terms of the capture formula, in multiplication order
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureFactors {
    pub base_rate: f64,
    pub health_modifier: f64,
    pub status_bonus: f64,
    pub device_bonus: f64,
    pub rarity_penalty: f64,
    pub level_bonus: f64,
    pub environment: f64,
}

impl CaptureFactors {
    pub fn compute(
        target: &Creature,
        device: &CaptureDevice,
        player_level: u32,
        environment: f64,
    ) -> Self {
        Self {
            base_rate: base_rate(target.level),
            health_modifier: health_modifier(target),
            status_bonus: status_bonus(target),
            device_bonus: device.effectiveness,
            rarity_penalty: rarity_penalty(target.rarity_score()),
            level_bonus: level_bonus(player_level),
            environment,
        }
    }

    /// Product of every term before clamping
    pub fn raw_chance(&self) -> f64 {
        self.base_rate
            * self.health_modifier
            * self.status_bonus
            * self.device_bonus
            * self.rarity_penalty
            * self.level_bonus
            * self.environment
    }

    pub fn chance(&self) -> f64 {
        clamp_chance(self.raw_chance())
    }
}

/// Stepped by creature level
pub fn base_rate(level: u32) -> f64 {
    match level {
        0..=5 => 0.4,
        6..=10 => 0.3,
        11..=20 => 0.2,
        21..=30 => 0.15,
        _ => 0.1,
    }
}

/// `0.1 + 0.8 * (1 - hp/max)`, within `[0.1, 0.9]`
pub fn health_modifier(target: &Creature) -> f64 {
    (0.1 + 0.8 * (1.0 - target.health_fraction())).clamp(0.1, 0.9)
}

/// 1.0 plus a bonus per incapacitating effect group present
pub fn status_bonus(target: &Creature) -> f64 {
    let mut bonus = 1.0;
    if target.has_status(StatusKind::Stun) || target.has_status(StatusKind::Paralysis) {
        bonus += 0.5;
    }
    if target.has_status(StatusKind::Freeze) {
        bonus += 0.3;
    }
    if target.has_status(StatusKind::Confusion) {
        bonus += 0.2;
    }
    if target.has_status(StatusKind::Poison) || target.has_status(StatusKind::Burn) {
        bonus += 0.1;
    }
    bonus
}

/// Stepped by the integer average of max health, attack, defense and speed
pub fn rarity_penalty(rarity_score: u32) -> f64 {
    match rarity_score {
        0..=50 => 1.0,
        51..=80 => 0.8,
        81..=120 => 0.6,
        121..=150 => 0.4,
        _ => 0.2,
    }
}

/// `1 + 0.01 * level`, capped at 1.5
pub fn level_bonus(player_level: u32) -> f64 {
    (1.0 + 0.01 * player_level as f64).min(1.5)
}

/// Final clamped capture chance
pub fn capture_chance(
    target: &Creature,
    device: &CaptureDevice,
    player_level: u32,
    environment: f64,
) -> f64 {
    CaptureFactors::compute(target, device, player_level, environment).chance()
}

/// Number of device shakes to show for a given chance (0-4)
pub fn shake_count(chance: f64) -> u8 {
    if chance >= 0.8 {
        4
    } else if chance >= 0.6 {
        3
    } else if chance >= 0.4 {
        2
    } else if chance >= 0.2 {
        1
    } else {
        0
    }
}

/// Result of one capture roll
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureRoll {
    pub chance: f64,
    pub roll: f64,
    pub success: bool,
    pub shake_count: u8,
    pub message: String,
}

/// Roll a capture attempt against `target`.
///
/// `forced_chance` replaces the formula when present but is still clamped
/// and still rolled against. On success the target has its stages reset,
/// its effects cleansed, its health raised to at least a quarter and is
/// marked owned. On failure the target is untouched.
pub fn attempt_capture<R: Rng + ?Sized>(
    target: &mut Creature,
    device: &CaptureDevice,
    player_level: u32,
    environment: f64,
    forced_chance: Option<f64>,
    rng: &mut R,
) -> CaptureRoll {
    let chance = match forced_chance {
        Some(forced) => clamp_chance(forced),
        None => capture_chance(target, device, player_level, environment),
    };
    let roll: f64 = rng.r#gen();
    let success = roll < chance;

    let message = if success {
        apply_capture_success(target);
        format!(
            "Success! {} has been captured using {}!",
            target.name, device.name
        )
    } else {
        escape_message(&target.name, &device.name, rng)
    };

    CaptureRoll {
        chance,
        roll,
        success,
        shake_count: shake_count(chance),
        message,
    }
}

fn apply_capture_success(target: &mut Creature) {
    target.reset_stages();
    target.cleanse();
    let floor = target.max_health() / 4;
    if target.health() < floor {
        target.set_health(floor.max(1));
    }
    target.owned = true;
}

fn escape_message<R: Rng + ?Sized>(creature: &str, device: &str, rng: &mut R) -> String {
    let pick: f64 = rng.r#gen();
    match ((pick * 4.0) as usize).min(3) {
        0 => format!("{creature} broke free from the {device}!"),
        1 => format!("The {device} failed to contain {creature}!"),
        2 => format!("{creature} resisted capture!"),
        _ => format!("So close! {creature} escaped at the last second!"),
    }
}

/// High-level or very sturdy creatures need special handling to catch
pub fn requires_special_capture(target: &Creature) -> bool {
    target.level >= 25 || target.max_health() >= 200
}

/// Human-readable conditions for catching a special creature
pub fn special_requirements(target: &Creature) -> Vec<String> {
    let mut requirements = Vec::new();
    if target.level >= 30 {
        requirements.push("Must be weakened to below 25% health".to_string());
    }
    if target.max_health() >= 250 {
        requirements.push("Requires Master-grade capture device".to_string());
    }
    requirements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CreatureId, Element, Stat, StatusEffect};
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha8Rng;

    fn wild(level: u32) -> Creature {
        Creature::new(CreatureId(42), "Sparkit", Element::Electric, level)
            .with_max_health(40)
            .with_attack(12)
            .with_defense(10)
            .with_speed(14)
    }

    #[test]
    fn test_base_rate_steps() {
        assert_eq!(base_rate(1), 0.4);
        assert_eq!(base_rate(5), 0.4);
        assert_eq!(base_rate(6), 0.3);
        assert_eq!(base_rate(20), 0.2);
        assert_eq!(base_rate(30), 0.15);
        assert_eq!(base_rate(31), 0.1);
    }

    #[test]
    fn test_rarity_penalty_steps() {
        assert_eq!(rarity_penalty(50), 1.0);
        assert_eq!(rarity_penalty(80), 0.8);
        assert_eq!(rarity_penalty(120), 0.6);
        assert_eq!(rarity_penalty(150), 0.4);
        assert_eq!(rarity_penalty(151), 0.2);
    }

    #[test]
    fn test_level_bonus_cap() {
        assert!((level_bonus(1) - 1.01).abs() < 0.001);
        assert!((level_bonus(50) - 1.5).abs() < 0.001);
        assert!((level_bonus(99) - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_status_bonus_groups() {
        let mut c = wild(3);
        assert_eq!(status_bonus(&c), 1.0);

        c.apply_status(StatusEffect::new(StatusKind::Stun, 2));
        c.apply_status(StatusEffect::new(StatusKind::Paralysis, 2));
        assert!((status_bonus(&c) - 1.5).abs() < 0.001);

        c.apply_status(StatusEffect::new(StatusKind::Freeze, 2));
        c.apply_status(StatusEffect::new(StatusKind::Confusion, 2));
        c.apply_status(StatusEffect::new(StatusKind::Burn, 2));
        assert!((status_bonus(&c) - 2.1).abs() < 0.001);
    }

    #[test]
    fn test_formula_matches_factor_product() {
        let mut c = wild(3);
        c.take_damage(30);
        let device = CaptureDevice::basic_net();
        let factors = CaptureFactors::compute(&c, &device, 10, 1.0);

        assert!((factors.health_modifier - 0.7).abs() < 0.001);
        // 0.4 * 0.7 * 1.0 * 1.0 * 1.0 * 1.1 * 1.0
        assert!((factors.chance() - 0.308).abs() < 0.001);
        assert!((capture_chance(&c, &device, 10, 1.0) - 0.308).abs() < 0.001);
    }

    #[test]
    fn test_chance_is_bounded() {
        let devices = CaptureDevice::presets();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for level in [1, 5, 12, 25, 40] {
            for damage in [0, 10, 39, 40] {
                for env in [0.0, 0.5, 1.0, 3.0, 100.0] {
                    for device in &devices {
                        let mut c = wild(level).with_max_health(40 + rng.gen_range(0..400));
                        c.take_damage(damage);
                        let chance = capture_chance(&c, device, rng.gen_range(0..120), env);
                        assert!((MIN_CAPTURE_CHANCE..=MAX_CAPTURE_CHANCE).contains(&chance));
                    }
                }
            }
        }
        assert_eq!(clamp_chance(f64::NAN), MIN_CAPTURE_CHANCE);
        assert_eq!(clamp_chance(-3.0), MIN_CAPTURE_CHANCE);
    }

    #[test]
    fn test_forced_chance_success_resets_target() {
        let mut c = wild(1).with_max_health(100);
        c.take_damage(99);
        c.stages.boost(Stat::Def, 2);
        c.apply_status(StatusEffect::new(StatusKind::Poison, 3));

        let mut rng = StepRng::new(0, 0);
        let roll = attempt_capture(&mut c, &CaptureDevice::basic_net(), 1, 1.0, Some(0.99), &mut rng);

        assert!(roll.success);
        assert_eq!(roll.chance, MAX_CAPTURE_CHANCE);
        assert_eq!(roll.shake_count, 4);
        assert!(c.owned);
        assert!(c.stages.is_clear());
        assert!(c.effects.is_empty());
        assert_eq!(c.health(), 25);
        assert_eq!(roll.message, "Success! Sparkit has been captured using Basic Net!");
    }

    #[test]
    fn test_failed_capture_leaves_target_untouched() {
        let mut c = wild(8);
        c.take_damage(10);
        c.stages.boost(Stat::Atk, 1);
        let before = c.clone();

        let mut rng = StepRng::new(u64::MAX, 0);
        let roll = attempt_capture(&mut c, &CaptureDevice::basic_net(), 1, 1.0, None, &mut rng);

        assert!(!roll.success);
        assert_eq!(c, before);
        assert!(roll.message.contains("Sparkit"));
    }

    #[test]
    fn test_forced_chance_still_clamped_low() {
        let mut c = wild(1);
        let mut rng = StepRng::new(0, 0);
        let roll = attempt_capture(&mut c, &CaptureDevice::basic_net(), 1, 1.0, Some(0.0), &mut rng);
        assert_eq!(roll.chance, MIN_CAPTURE_CHANCE);
        // A draw of exactly 0.0 is still below the 1% floor
        assert!(roll.success);
    }

    #[test]
    fn test_shake_count() {
        assert_eq!(shake_count(0.95), 4);
        assert_eq!(shake_count(0.6), 3);
        assert_eq!(shake_count(0.45), 2);
        assert_eq!(shake_count(0.2), 1);
        assert_eq!(shake_count(0.01), 0);
    }

    #[test]
    fn test_special_requirements() {
        let boss = wild(32).with_max_health(260);
        assert!(requires_special_capture(&boss));
        assert_eq!(special_requirements(&boss).len(), 2);
        assert!(!requires_special_capture(&wild(3)));
    }
}
