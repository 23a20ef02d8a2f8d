//! Champion and skill records as extracted from the game data.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    BannerLords,
    HighElves,
    SacredOrder,
    Barbarians,
    OgrynTribes,
    Lizardmen,
    Skinwalkers,
    Orcs,
    Demonspawn,
    UndeadHordes,
    DarkElves,
    KnightsRevenant,
    Dwarves,
    Shadowkin,
    SylvanWatchers,
    #[serde(other)]
    Unknown,
}

impl Faction {
    pub fn display_name(&self) -> &'static str {
        match self {
            Faction::BannerLords => "Banner Lords",
            Faction::HighElves => "High Elves",
            Faction::SacredOrder => "The Sacred Order",
            Faction::Barbarians => "Barbarians",
            Faction::OgrynTribes => "Ogryn Tribes",
            Faction::Lizardmen => "Lizardmen",
            Faction::Skinwalkers => "Skinwalkers",
            Faction::Orcs => "Orcs",
            Faction::Demonspawn => "Demonspawn",
            Faction::UndeadHordes => "Undead Hordes",
            Faction::DarkElves => "Dark Elves",
            Faction::KnightsRevenant => "Knights Revenant",
            Faction::Dwarves => "Dwarves",
            Faction::Shadowkin => "Shadowkin",
            Faction::SylvanWatchers => "Sylvan Watchers",
            Faction::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythical,
    #[serde(other)]
    Unknown,
}

impl Rarity {
    pub fn display_name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythical => "Mythical",
            Rarity::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affinity {
    Magic,
    Force,
    Spirit,
    Void,
    #[serde(other)]
    Unknown,
}

impl Affinity {
    pub fn display_name(&self) -> &'static str {
        match self {
            Affinity::Magic => "Magic",
            Affinity::Force => "Force",
            Affinity::Spirit => "Spirit",
            Affinity::Void => "Void",
            Affinity::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Attack,
    Defense,
    Hp,
    Support,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Attack => "Attack",
            Role::Defense => "Defense",
            Role::Hp => "HP",
            Role::Support => "Support",
            Role::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Champion {
    pub name: String,
    pub faction: Faction,
    pub rarity: Rarity,
    pub affinity: Affinity,
    pub role: Role,
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub resistance: u32,
    pub accuracy: u32,
    /// Percentages.
    pub critical_chance: f64,
    pub critical_damage: f64,
    pub critical_heal: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub cooldown: u32,
    #[serde(default)]
    pub multiplier_formula: Option<String>,
    /// Name of the champion owning the skill.
    pub champion: String,
}

impl Skill {
    /// Build a skill belonging to `champion`.
    pub fn for_champion(
        champion: &Champion,
        name: impl Into<String>,
        description: impl Into<String>,
        cooldown: u32,
        multiplier_formula: Option<String>,
    ) -> Self {
        Skill {
            name: name.into(),
            description: description.into(),
            cooldown,
            multiplier_formula,
            champion: champion.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn champion_from_json() {
        let champion: Champion = serde_json::from_str(
            r#"{
                "name": "Kael",
                "faction": "dark_elves",
                "rarity": "rare",
                "affinity": "magic",
                "role": "attack",
                "health": 13710,
                "attack": 1200,
                "defense": 914,
                "speed": 103,
                "resistance": 30,
                "accuracy": 10,
                "critical_chance": 15,
                "critical_damage": 57,
                "critical_heal": 0
            }"#,
        )
        .unwrap();

        assert_eq!("Dark Elves", champion.faction.display_name());
        assert_eq!(Role::Attack, champion.role);
        assert_eq!(57.0, champion.critical_damage);
    }

    #[test]
    fn unknown_category_falls_back() {
        let faction: Faction = serde_json::from_str(r#""nyresan_union""#).unwrap();
        assert_eq!(Faction::Unknown, faction);
        assert_eq!("Unknown", faction.display_name());
    }

    #[test]
    fn skill_without_formula() {
        let skill: Skill = serde_json::from_str(
            r#"{"name": "Disintegrate", "description": "Attacks all enemies.", "cooldown": 4, "champion": "Kael"}"#,
        )
        .unwrap();
        assert_eq!(None, skill.multiplier_formula);
    }
}
