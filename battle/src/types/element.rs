//! Elemental affinities and the effectiveness chart

use rand::Rng;

/// Elemental affinity carried by every creature (10 elements)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Element {
    #[default]
    None = 0,
    Fire = 1,
    Water = 2,
    Electric = 3,
    Grass = 4,
    Ice = 5,
    Earth = 6,
    Metal = 7,
    Wind = 8,
    Plasma = 9,
}

impl Element {
    /// All 10 elements in chart order
    pub const ALL: [Element; 10] = [
        Element::None,
        Element::Fire,
        Element::Water,
        Element::Electric,
        Element::Grass,
        Element::Ice,
        Element::Earth,
        Element::Metal,
        Element::Wind,
        Element::Plasma,
    ];

    /// Get all elements as a slice
    pub fn all() -> &'static [Element] {
        &Self::ALL
    }

    /// Damage multiplier when this element attacks `defender`
    pub fn effectiveness(&self, defender: Element) -> f64 {
        ELEMENT_CHART
            .get(*self as usize)
            .and_then(|row| row.get(defender as usize))
            .copied()
            .unwrap_or(1.0)
    }

    /// Effectiveness with a random ±10% spread for display variety.
    ///
    /// Immunities stay at exactly 0.0.
    pub fn effectiveness_with_jitter<R: Rng + ?Sized>(&self, defender: Element, rng: &mut R) -> f64 {
        let base = self.effectiveness(defender);
        if base <= 0.0 {
            return 0.0;
        }
        base * rng.gen_range(0.9..=1.1)
    }

    /// Parse from a display name (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "neutral" => Some(Element::None),
            "fire" => Some(Element::Fire),
            "water" => Some(Element::Water),
            "electric" => Some(Element::Electric),
            "grass" => Some(Element::Grass),
            "ice" => Some(Element::Ice),
            "earth" => Some(Element::Earth),
            "metal" => Some(Element::Metal),
            "wind" => Some(Element::Wind),
            "plasma" => Some(Element::Plasma),
            _ => None,
        }
    }

    /// Convert to canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::None => "None",
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Electric => "Electric",
            Element::Grass => "Grass",
            Element::Ice => "Ice",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Wind => "Wind",
            Element::Plasma => "Plasma",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 10x10 elemental effectiveness chart
/// Row = attacking element, Column = defending element
/// Values: 0.0 = immune, 0.25/0.5 = resisted, 1.0 = neutral, 1.5/2.0 = super effective
///
/// Order: None, Fire, Water, Electric, Grass, Ice, Earth, Metal, Wind, Plasma
#[rustfmt::skip]
pub static ELEMENT_CHART: [[f64; 10]; 10] = [
    // None attacking
    [1.0, 1.0,  1.0,  1.0,  1.0,  1.0,  1.0,  1.0,  1.0,  1.0 ],
    // Fire attacking
    [1.0, 0.5,  0.5,  1.0,  2.0,  2.0,  0.5,  1.5,  1.0,  0.5 ],
    // Water attacking
    [1.0, 2.0,  0.5,  1.0,  0.5,  1.0,  2.0,  1.0,  1.0,  1.5 ],
    // Electric attacking
    [1.0, 1.0,  2.0,  0.5,  0.5,  1.0,  0.0,  1.5,  2.0,  0.25],
    // Grass attacking
    [1.0, 0.5,  2.0,  1.5,  0.5,  1.0,  2.0,  0.5,  0.5,  1.0 ],
    // Ice attacking
    [1.0, 0.5,  0.5,  1.0,  2.0,  0.5,  1.5,  0.5,  2.0,  1.0 ],
    // Earth attacking
    [1.0, 2.0,  1.0,  2.0,  0.5,  1.0,  1.0,  2.0,  0.0,  1.5 ],
    // Metal attacking
    [1.0, 0.5,  0.5,  0.5,  1.0,  2.0,  1.5,  0.5,  1.0,  1.0 ],
    // Wind attacking
    [1.0, 1.0,  1.0,  0.5,  2.0,  1.0,  1.0,  0.5,  0.5,  1.5 ],
    // Plasma attacking
    [1.0, 1.0,  0.5,  1.5,  1.0,  2.0,  0.5,  2.0,  1.0,  0.25],
];
