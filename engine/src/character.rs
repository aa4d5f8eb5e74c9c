//! Selectable character roster. The selection screen itself is outside the
//! engine; it hands the chosen id in before the simulation starts.

/// Stat multipliers a character contributes to a freshly spawned entity.
#[derive(Debug, Clone, Copy)]
pub struct CharacterStats {
    /// Starting and maximum health.
    pub hp: f32,
    /// Multiplies movement speed on top of power-ups.
    pub speed: f32,
    /// Multiplies attack damage on top of power-ups.
    pub damage: f32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            hp: 100.0,
            speed: 1.0,
            damage: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Character {
    pub id: &'static str,
    pub name: &'static str,
    pub glyph: &'static str,
    pub ascii: char,
    pub description: &'static str,
    pub stats: CharacterStats,
}

const fn stats(hp: f32, speed: f32, damage: f32) -> CharacterStats {
    CharacterStats { hp, speed, damage }
}

pub const ROSTER: &[Character] = &[
    Character {
        id: "warrior",
        name: "Warrior",
        glyph: "🗡️",
        ascii: 'W',
        description: "Balanced fighter with high HP",
        stats: stats(120.0, 1.0, 1.0),
    },
    Character {
        id: "ninja",
        name: "Ninja",
        glyph: "🐲",
        ascii: 'N',
        description: "Fast and agile with low HP",
        stats: stats(80.0, 1.3, 1.2),
    },
    Character {
        id: "tank",
        name: "Tank",
        glyph: "🛡️",
        ascii: 'T',
        description: "Slow but very durable",
        stats: stats(150.0, 0.8, 0.9),
    },
    Character {
        id: "mage",
        name: "Mage",
        glyph: "🔮",
        ascii: 'M',
        description: "High damage but fragile",
        stats: stats(70.0, 0.9, 1.4),
    },
    Character {
        id: "archer",
        name: "Archer",
        glyph: "🏹",
        ascii: 'A',
        description: "Ranged specialist",
        stats: stats(90.0, 1.1, 1.1),
    },
    Character {
        id: "berserker",
        name: "Berserker",
        glyph: "😈",
        ascii: 'B',
        description: "High damage when low HP",
        stats: stats(100.0, 1.0, 1.0),
    },
    Character {
        id: "monk",
        name: "Monk",
        glyph: "☯️",
        ascii: 'K',
        description: "Balanced with healing ability",
        stats: stats(110.0, 1.0, 1.0),
    },
    Character {
        id: "robot",
        name: "Robot",
        glyph: "🤖",
        ascii: 'R',
        description: "Mechanical precision",
        stats: stats(95.0, 1.0, 1.1),
    },
];

/// Looks up a character by id.
pub fn get(id: &str) -> Option<&'static Character> {
    ROSTER.iter().find(|c| c.id == id)
}

/// Stats for the given id, falling back to the baseline fighter.
pub fn stats_for(id: &str) -> CharacterStats {
    get(id).map(|c| c.stats).unwrap_or_default()
}
