//! Row collections written to the two sheets of the spreadsheet.
//!
//! Both sheets share the same shape: a fixed header row followed by one row
//! per accepted record. The per-sheet differences live in [`SheetRecord`].
use std::fmt;
use std::marker::PhantomData;

use sheets_client::errors::Result as SheetsResult;
use sheets_client::format::{self, Banding};
use sheets_client::model::{AppendValuesResponse, CellValue, Color, Row, UpdateValuesResponse};
use sheets_client::SheetsApi;
use tracing::{debug, info};

use crate::records::{Champion, Skill};

/// A record type with a fixed column schema and a dedicated sheet.
pub trait SheetRecord {
    /// Title of the sheet holding these records.
    const SHEET_TITLE: &'static str;
    /// Position of the sheet in the spreadsheet.
    const SHEET_INDEX: usize;
    /// Column names, in row order.
    const HEADER: &'static [&'static str];

    /// Name used when logging.
    fn label(&self) -> &str;

    /// Placeholder and template entries of the game data are rejected.
    fn is_accepted(&self) -> bool;

    /// One value per column of `HEADER`.
    fn to_row(&self) -> Row;
}

impl SheetRecord for Champion {
    const SHEET_TITLE: &'static str = "Champions";
    const SHEET_INDEX: usize = 0;
    const HEADER: &'static [&'static str] = &[
        "Name",
        "Faction",
        "Rarity",
        "Affinity",
        "Role",
        "Health",
        "Attack",
        "Defense",
        "Speed",
        "Resistance",
        "Accuracy",
        "Critical Chance",
        "Critical Damage",
        "Critical Heal",
    ];

    fn label(&self) -> &str {
        &self.name
    }

    fn is_accepted(&self) -> bool {
        !self.name.trim().is_empty() && !self.name.to_lowercase().contains("hero")
    }

    fn to_row(&self) -> Row {
        vec![
            self.name.as_str().into(),
            self.faction.display_name().into(),
            self.rarity.display_name().into(),
            self.affinity.display_name().into(),
            self.role.display_name().into(),
            self.health.into(),
            self.attack.into(),
            self.defense.into(),
            self.speed.into(),
            self.resistance.into(),
            self.accuracy.into(),
            self.critical_chance.into(),
            self.critical_damage.into(),
            self.critical_heal.into(),
        ]
    }
}

impl SheetRecord for Skill {
    const SHEET_TITLE: &'static str = "Skills";
    const SHEET_INDEX: usize = 1;
    const HEADER: &'static [&'static str] =
        &["Name", "Description", "Cooldown", "Multiplier", "Champion"];

    fn label(&self) -> &str {
        &self.name
    }

    fn is_accepted(&self) -> bool {
        let name = self.name.to_lowercase();
        // Excludes the "Skill Name" template row.
        let is_template = name.contains("skill") && name.contains("name");

        !self.name.trim().is_empty() && !is_template && !self.description.trim().is_empty()
    }

    fn to_row(&self) -> Row {
        vec![
            self.name.as_str().into(),
            self.description.as_str().into(),
            self.cooldown.into(),
            self.multiplier_formula.clone().unwrap_or_default().into(),
            self.champion.as_str().into(),
        ]
    }
}

/// Colors applied to every sheet by [`SheetRows::format`].
pub const BANDING: Banding = Banding {
    header: Color {
        red: 0.357,
        green: 0.584,
        blue: 0.976,
    },
    first_band: Color {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    },
    second_band: Color {
        red: 0.910,
        green: 0.941,
        blue: 0.996,
    },
};

/// In-memory rows for one sheet, written in a single request.
pub struct SheetRows<R> {
    rows: Vec<Row>,
    _record: PhantomData<fn(&R)>,
}

impl<R> fmt::Debug for SheetRows<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetRows")
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl<R> Default for SheetRows<R> {
    fn default() -> Self {
        SheetRows {
            rows: Vec::new(),
            _record: PhantomData,
        }
    }
}

impl<R: SheetRecord> SheetRows<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_row() -> Row {
        R::HEADER.iter().map(|&name| CellValue::from(name)).collect()
    }

    /// Push the column names as the next row.
    ///
    /// Not deduplicated, call it once before any value.
    pub fn add_header_row(&mut self) {
        info!(sheet = R::SHEET_TITLE, "creating header row");
        self.rows.push(Self::header_row());
    }

    /// Push a row for `record` if it is accepted, returning whether it was.
    pub fn add_value(&mut self, record: &R) -> bool {
        if !record.is_accepted() {
            debug!(sheet = R::SHEET_TITLE, name = record.label(), "skipping record");
            return false;
        }
        info!(sheet = R::SHEET_TITLE, name = record.label(), "creating row");
        self.rows.push(record.to_row());
        true
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Overwrite the sheet with every collected row, starting at the first
    /// cell.
    ///
    /// Rows below the written block are left as they were.
    pub async fn flush<C>(
        &self,
        client: &C,
        spreadsheet_id: &str,
    ) -> SheetsResult<UpdateValuesResponse>
    where
        C: SheetsApi + ?Sized,
    {
        info!(sheet = R::SHEET_TITLE, rows = self.rows.len(), "populating sheet");
        client
            .update_values(spreadsheet_id, R::SHEET_TITLE, &self.rows)
            .await
    }

    /// Append every collected row after the current content of the sheet.
    pub async fn append<C>(
        &self,
        client: &C,
        spreadsheet_id: &str,
    ) -> SheetsResult<AppendValuesResponse>
    where
        C: SheetsApi + ?Sized,
    {
        info!(sheet = R::SHEET_TITLE, rows = self.rows.len(), "appending to sheet");
        client
            .append_values(spreadsheet_id, R::SHEET_TITLE, &self.rows)
            .await
    }

    /// Bold the header row and band the rows of the sheet.
    pub async fn format<C>(&self, client: &C, spreadsheet_id: &str) -> SheetsResult<()>
    where
        C: SheetsApi + ?Sized,
    {
        format::bold_header_row(client, spreadsheet_id, R::SHEET_INDEX).await?;
        format::set_banding(
            client,
            spreadsheet_id,
            R::SHEET_INDEX,
            R::SHEET_TITLE,
            &BANDING,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sheets_client::model::SheetSpec;
    use sheets_client::testing::{Call, FakeGoogle};

    use super::*;
    use crate::records::{Affinity, Faction, Rarity, Role};

    fn champion(name: &str) -> Champion {
        Champion {
            name: name.to_string(),
            faction: Faction::DarkElves,
            rarity: Rarity::Rare,
            affinity: Affinity::Magic,
            role: Role::Attack,
            health: 13710,
            attack: 1200,
            defense: 914,
            speed: 103,
            resistance: 30,
            accuracy: 10,
            critical_chance: 15.0,
            critical_damage: 57.0,
            critical_heal: 0.0,
        }
    }

    fn skill(name: &str, description: &str) -> Skill {
        Skill::for_champion(&champion("Kael"), name, description, 4, None)
    }

    #[test]
    fn champion_filter() {
        let mut rows = SheetRows::<Champion>::new();
        for name in ["", "   ", "Hero", "Template HERO", "superhero"] {
            assert!(!rows.add_value(&champion(name)), "accepted {name:?}");
        }
        assert!(rows.is_empty());

        assert!(rows.add_value(&champion("Kael")));
        assert_eq!(1, rows.len());
    }

    #[test]
    fn skill_filter() {
        let mut rows = SheetRows::<Skill>::new();
        let rejected = [
            skill("", "Attacks 1 enemy."),
            skill("  ", "Attacks 1 enemy."),
            skill("Disintegrate", ""),
            skill("Disintegrate", " \t"),
            skill("Skill Name", "Attacks 1 enemy."),
            skill("NAME of the SKILL", "Attacks 1 enemy."),
        ];
        for record in &rejected {
            assert!(!rows.add_value(record), "accepted {record:?}");
        }
        assert!(rows.is_empty());

        // Only one of the two words.
        assert!(rows.add_value(&skill("Skill Breaker", "Attacks 1 enemy.")));
        assert!(rows.add_value(&skill("Nameless Dread", "Attacks all enemies.")));
        assert_eq!(2, rows.len());
    }

    #[test]
    fn missing_formula_is_empty_text() {
        let mut rows = SheetRows::<Skill>::new();
        rows.add_value(&skill("Disintegrate", "Attacks all enemies."));
        assert_eq!(CellValue::Text(String::new()), rows.rows()[0][3]);

        let with_formula = Skill::for_champion(
            &champion("Kael"),
            "Dark Bolt",
            "Attacks 1 enemy.",
            0,
            Some("3.8*ATK".to_string()),
        );
        rows.add_value(&with_formula);
        assert_eq!(CellValue::from("3.8*ATK"), rows.rows()[1][3]);
        assert_eq!(CellValue::from("Kael"), rows.rows()[1][4]);
    }

    #[test]
    fn header_matches_row_width() {
        assert_eq!(14, SheetRows::<Champion>::header_row().len());
        assert_eq!(14, champion("Kael").to_row().len());
        assert_eq!(5, SheetRows::<Skill>::header_row().len());
        assert_eq!(5, skill("a", "b").to_row().len());
    }

    #[test]
    fn header_not_deduplicated() {
        let mut rows = SheetRows::<Skill>::new();
        rows.add_header_row();
        rows.add_header_row();
        assert_eq!(2, rows.len());
    }

    #[tokio::test]
    async fn flush_overwrites_whole_sheet() {
        let fake = FakeGoogle::default();
        fake.insert_spreadsheet("abc", &[SheetSpec::new("Champions"), SheetSpec::new("Skills")]);

        let mut rows = SheetRows::<Champion>::new();
        rows.add_header_row();
        rows.add_value(&champion("Kael"));
        rows.flush(&fake, "abc").await.unwrap();

        let calls = fake.calls();
        assert_eq!(1, calls.len());
        let Call::UpdateValues { range, rows: written, .. } = &calls[0] else {
            panic!("unexpected call: {:?}", calls[0]);
        };
        assert_eq!("Champions", range.as_str());
        assert_eq!(SheetRows::<Champion>::header_row(), written[0]);

        let expected: Row = vec![
            "Kael".into(),
            "Dark Elves".into(),
            "Rare".into(),
            "Magic".into(),
            "Attack".into(),
            13710_u32.into(),
            1200_u32.into(),
            914_u32.into(),
            103_u32.into(),
            30_u32.into(),
            10_u32.into(),
            15.0.into(),
            57.0.into(),
            0.0.into(),
        ];
        assert_eq!(expected, written[1]);

        // Flushing again is another full overwrite of the same range.
        rows.flush(&fake, "abc").await.unwrap();
        assert_eq!(2, fake.sheet_values("abc", "Champions").len());
    }

    #[tokio::test]
    async fn append_goes_after_existing_rows() {
        let fake = FakeGoogle::default();
        fake.insert_spreadsheet("abc", &[SheetSpec::new("Champions"), SheetSpec::new("Skills")]);

        let mut first = SheetRows::<Skill>::new();
        first.add_header_row();
        first.flush(&fake, "abc").await.unwrap();

        let mut more = SheetRows::<Skill>::new();
        more.add_value(&skill("Disintegrate", "Attacks all enemies."));
        more.append(&fake, "abc").await.unwrap();

        let values = fake.sheet_values("abc", "Skills");
        assert_eq!(2, values.len());
        assert_eq!(CellValue::from("Disintegrate"), values[1][0]);
    }

    #[tokio::test]
    async fn format_bolds_and_bands() {
        let fake = FakeGoogle::default();
        fake.insert_spreadsheet("abc", &[SheetSpec::new("Champions"), SheetSpec::new("Skills")]);

        let mut rows = SheetRows::<Skill>::new();
        rows.add_header_row();
        rows.add_value(&skill("Disintegrate", "Attacks all enemies."));
        rows.flush(&fake, "abc").await.unwrap();
        rows.format(&fake, "abc").await.unwrap();

        let sheet_id = fake.sheet_id_at("abc", 1).unwrap();
        let spreadsheet = fake.spreadsheet("abc").unwrap();
        let banded = &spreadsheet.sheets[1].banded_ranges;
        assert_eq!(1, banded.len());
        assert_eq!(sheet_id, banded[0].range.sheet_id);
        assert_eq!(Some(2), banded[0].range.end_row_index);
        assert!(spreadsheet.sheets[0].banded_ranges.is_empty());
    }
}
