//! Timed status effects attached to a creature

/// Status effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    Stun,
    Paralysis,
    Freeze,
    Confusion,
    Poison,
    Burn,
    Sleep,
    Shielded,
    Regeneration,
}

impl StatusKind {
    pub const ALL: [StatusKind; 9] = [
        StatusKind::Stun,
        StatusKind::Paralysis,
        StatusKind::Freeze,
        StatusKind::Confusion,
        StatusKind::Poison,
        StatusKind::Burn,
        StatusKind::Sleep,
        StatusKind::Shielded,
        StatusKind::Regeneration,
    ];

    /// Whether a creature under this effect skips its action
    pub fn prevents_action(&self) -> bool {
        matches!(self, StatusKind::Stun | StatusKind::Freeze | StatusKind::Sleep)
    }

    /// Parse from a display name (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "stun" => Some(StatusKind::Stun),
            "paralysis" => Some(StatusKind::Paralysis),
            "freeze" => Some(StatusKind::Freeze),
            "confusion" => Some(StatusKind::Confusion),
            "poison" => Some(StatusKind::Poison),
            "burn" => Some(StatusKind::Burn),
            "sleep" => Some(StatusKind::Sleep),
            "shielded" => Some(StatusKind::Shielded),
            "regeneration" => Some(StatusKind::Regeneration),
            _ => None,
        }
    }

    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Stun => "Stun",
            StatusKind::Paralysis => "Paralysis",
            StatusKind::Freeze => "Freeze",
            StatusKind::Confusion => "Confusion",
            StatusKind::Poison => "Poison",
            StatusKind::Burn => "Burn",
            StatusKind::Sleep => "Sleep",
            StatusKind::Shielded => "Shielded",
            StatusKind::Regeneration => "Regeneration",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One timed effect: kind, turns remaining and intensity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub remaining: u32,
    pub intensity: f64,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, remaining: u32) -> Self {
        Self {
            kind,
            remaining,
            intensity: 1.0,
        }
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

/// Active effects on one creature, at most one entry per kind
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an effect in. An existing entry of the same kind takes the
    /// larger duration and the larger intensity of the two.
    pub fn apply(&mut self, effect: StatusEffect) {
        match self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => {
                existing.remaining = existing.remaining.max(effect.remaining);
                existing.intensity = existing.intensity.max(effect.intensity);
            }
            None => self.effects.push(effect),
        }
    }

    /// Advance one turn: decrement every duration and drop the ones that hit zero.
    /// Returns the kinds that expired on this tick.
    pub fn tick(&mut self) -> Vec<StatusKind> {
        for effect in &mut self.effects {
            effect.remaining = effect.remaining.saturating_sub(1);
        }
        let expired = self
            .effects
            .iter()
            .filter(|e| e.is_expired())
            .map(|e| e.kind)
            .collect();
        self.effects.retain(|e| !e.is_expired());
        expired
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects
            .iter()
            .find(|e| e.kind == kind && !e.is_expired())
    }

    /// Remove every effect immediately
    pub fn cleanse(&mut self) {
        self.effects.clear();
    }

    /// Active (unexpired) effects
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter().filter(|e| !e.is_expired())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}
