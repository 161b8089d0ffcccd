//! Elemental matchup helpers

use crate::types::Element;

/// Multiplier at or below which a hit does nothing
pub const IMMUNE_THRESHOLD: f64 = 0.0;
/// Multiplier at or above which a hit counts as super effective
pub const SUPER_EFFECTIVE_THRESHOLD: f64 = 1.5;
/// Multiplier below which a (non-immune) hit counts as resisted
pub const NOT_VERY_EFFECTIVE_THRESHOLD: f64 = 0.75;

/// Check if `defender` takes nothing from `attacker`
pub fn is_immune(attacker: Element, defender: Element) -> bool {
    attacker.effectiveness(defender) <= IMMUNE_THRESHOLD
}

/// Check if `attacker` hits `defender` for at least 1.5x
pub fn is_super_effective(attacker: Element, defender: Element) -> bool {
    attacker.effectiveness(defender) >= SUPER_EFFECTIVE_THRESHOLD
}

/// Check if `attacker` hits `defender` for more than 0 but less than 0.75x
pub fn is_not_very_effective(attacker: Element, defender: Element) -> bool {
    let eff = attacker.effectiveness(defender);
    eff > IMMUNE_THRESHOLD && eff < NOT_VERY_EFFECTIVE_THRESHOLD
}

/// Get all elements that are super effective against the defender
pub fn weaknesses(defender: Element) -> Vec<Element> {
    Element::all()
        .iter()
        .copied()
        .filter(|a| is_super_effective(*a, defender))
        .collect()
}

/// Get all elements that the defender resists
pub fn resistances(defender: Element) -> Vec<Element> {
    Element::all()
        .iter()
        .copied()
        .filter(|a| is_not_very_effective(*a, defender))
        .collect()
}

/// Get all elements that the defender is immune to
pub fn immunities(defender: Element) -> Vec<Element> {
    Element::all()
        .iter()
        .copied()
        .filter(|a| is_immune(*a, defender))
        .collect()
}

/// Pick the attacking element from `options` with the highest multiplier.
/// Ties keep the earliest option.
pub fn best_attacking_element(options: &[Element], defender: Element) -> Option<Element> {
    options.iter().copied().fold(None, |best, candidate| match best {
        Some(b) if b.effectiveness(defender) >= candidate.effectiveness(defender) => Some(b),
        _ => Some(candidate),
    })
}
