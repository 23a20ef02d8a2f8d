use chrono::{Local, NaiveDate};
use sheets_client::errors::SheetsError;
use sheets_client::format;
use sheets_client::model::SheetSpec;
use sheets_client::{DriveApi, SheetsApi};
use tracing::{info, warn};

use crate::errors::Result;
use crate::id_store::SpreadsheetIdStore;
use crate::records::{Champion, Skill};
use crate::sheet::{SheetRecord, SheetRows};

/// Where a run started from, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// No id file yet.
    NoLocalFile,
    /// An id file exists but the spreadsheet it names is gone.
    LocalFileNoRemote,
    /// The id file names a spreadsheet that still exists.
    LocalFileRemoteExists,
}

/// Title of the spreadsheet, stamped with the day of the last update.
pub fn spreadsheet_title(date: NaiveDate) -> String {
    format!(
        "RSL - Champions' multipliers (last updated: {})",
        date.format("%Y-%m-%d")
    )
}

fn sheet_specs() -> [SheetSpec; 2] {
    [
        SheetSpec::new(Champion::SHEET_TITLE),
        SheetSpec::new(Skill::SHEET_TITLE),
    ]
}

/// The spreadsheet holding the champion and skill sheets of this
/// installation.
#[derive(Debug)]
pub struct RaidSpreadsheet<C> {
    client: C,
    store: SpreadsheetIdStore,
    spreadsheet_id: String,
    initial_state: InitState,
    champions: SheetRows<Champion>,
    skills: SheetRows<Skill>,
}

impl<C> RaidSpreadsheet<C>
where
    C: SheetsApi + DriveApi,
{
    /// Resolve the spreadsheet to write to, creating it if needed.
    ///
    /// Any failure aborts initialization. A file created before a failed
    /// remote creation is left empty and is picked up as
    /// `LocalFileNoRemote` by the next run.
    pub async fn initialize(client: C, store: SpreadsheetIdStore) -> Result<Self> {
        let title = spreadsheet_title(Local::now().date_naive());
        let stored = store.read()?;
        let initial_state = resolve_state(&client, stored.as_deref(), &store).await?;

        let spreadsheet_id = match initial_state {
            InitState::NoLocalFile => {
                store.create_empty()?;
                let id = create_spreadsheet(&client, &title).await?;
                store.write(&id)?;
                id
            }
            InitState::LocalFileNoRemote => {
                info!("spreadsheet does not exist");
                let id = create_spreadsheet(&client, &title).await?;
                store.write(&id)?;
                id
            }
            InitState::LocalFileRemoteExists => {
                info!("spreadsheet already exists on drive, reusing it");
                // Reuse keeps the id file untouched. Updating the existing
                // content is a full overwrite done by the next populate.
                stored.unwrap_or_default()
            }
        };

        let mut champions = SheetRows::new();
        champions.add_header_row();
        let mut skills = SheetRows::new();
        skills.add_header_row();

        Ok(RaidSpreadsheet {
            client,
            store,
            spreadsheet_id,
            initial_state,
            champions,
            skills,
        })
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &SpreadsheetIdStore {
        &self.store
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn initial_state(&self) -> InitState {
        self.initial_state
    }

    pub fn champion_rows(&self) -> &SheetRows<Champion> {
        &self.champions
    }

    pub fn skill_rows(&self) -> &SheetRows<Skill> {
        &self.skills
    }

    pub fn add_champion(&mut self, champion: &Champion) -> bool {
        self.champions.add_value(champion)
    }

    pub fn add_skill(&mut self, skill: &Skill) -> bool {
        self.skills.add_value(skill)
    }

    /// Write every collected champion row to the champion sheet.
    pub async fn populate_champions(&self) -> Result<()> {
        info!("populating champion data");
        self.champions
            .flush(&self.client, &self.spreadsheet_id)
            .await?;
        Ok(())
    }

    /// Write every collected skill row to the skill sheet.
    pub async fn populate_skills(&self) -> Result<()> {
        info!("populating skill data");
        self.skills.flush(&self.client, &self.spreadsheet_id).await?;
        Ok(())
    }

    /// Format both sheets and stamp the title with today's date.
    ///
    /// Meant to run after populating, banding covers the rows present at
    /// that point.
    pub async fn finalize(&self) -> Result<()> {
        self.finalize_at(Local::now().date_naive()).await
    }

    pub async fn finalize_at(&self, date: NaiveDate) -> Result<()> {
        if !self.champions.is_empty() {
            self.champions
                .format(&self.client, &self.spreadsheet_id)
                .await?;
        }
        if !self.skills.is_empty() {
            self.skills.format(&self.client, &self.spreadsheet_id).await?;
        }
        format::rename_spreadsheet(&self.client, &self.spreadsheet_id, &spreadsheet_title(date))
            .await?;
        Ok(())
    }
}

/// Decide the starting state from the content of the id file (`None` when
/// missing) and the remote spreadsheet it points to.
pub async fn resolve_state<C>(
    client: &C,
    stored: Option<&str>,
    store: &SpreadsheetIdStore,
) -> Result<InitState>
where
    C: DriveApi + ?Sized,
{
    let Some(id) = stored else {
        return Ok(InitState::NoLocalFile);
    };

    // An empty id can't name a spreadsheet, looking it up would instead hit
    // the file listing endpoint.
    if id.trim().is_empty() {
        warn!(path = %store.path().display(), "spreadsheet id file is empty");
        return Ok(InitState::LocalFileNoRemote);
    }

    if client.file_exists(id).await? {
        Ok(InitState::LocalFileRemoteExists)
    } else {
        Ok(InitState::LocalFileNoRemote)
    }
}

async fn create_spreadsheet<C>(client: &C, title: &str) -> Result<String>
where
    C: SheetsApi + ?Sized,
{
    info!(%title, "creating spreadsheet");
    let spreadsheet = client.create_spreadsheet(title, &sheet_specs()).await?;
    let id = spreadsheet
        .spreadsheet_id
        .ok_or(SheetsError::MissingSpreadsheetId)?;
    info!(spreadsheet_id = %id, "spreadsheet created");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sheets_client::model::{CellValue, Request};
    use sheets_client::testing::{Call, FakeGoogle};
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::errors::RaidSheetsError;
    use crate::records::{Affinity, Faction, Rarity, Role};

    const TITLE_PREFIX: &str = "RSL - Champions' multipliers (last updated: ";

    fn store_in(dir: &TempDir) -> SpreadsheetIdStore {
        SpreadsheetIdStore::new(dir.path().join("resources/spreadsheet_id.txt"))
    }

    fn kael() -> Champion {
        Champion {
            name: "Kael".to_string(),
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

    #[test]
    fn title_has_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            "RSL - Champions' multipliers (last updated: 2026-03-07)",
            spreadsheet_title(date)
        );
    }

    #[tokio::test]
    async fn no_local_file_creates_spreadsheet() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let raid = RaidSpreadsheet::initialize(FakeGoogle::default(), store.clone())
            .await
            .unwrap();

        assert_eq!(InitState::NoLocalFile, raid.initial_state());
        assert_eq!(1, raid.client().spreadsheet_count());
        assert_eq!(
            raid.spreadsheet_id(),
            fs::read_to_string(store.path()).unwrap()
        );

        // No existence check without a stored id.
        let calls = raid.client().calls();
        assert_eq!(vec!["create_spreadsheet"], raid.client().call_names());
        let Call::CreateSpreadsheet { title, sheets } = &calls[0] else {
            panic!("unexpected call: {:?}", calls[0]);
        };
        assert!(title.starts_with(TITLE_PREFIX), "{title}");
        assert_eq!(
            vec![SheetSpec::new("Champions"), SheetSpec::new("Skills")],
            *sheets
        );

        let created = raid.client().spreadsheet(raid.spreadsheet_id()).unwrap();
        let titles: Vec<_> = created
            .sheets
            .iter()
            .map(|sheet| sheet.properties.title.clone().unwrap())
            .collect();
        assert_eq!(vec!["Champions", "Skills"], titles);
        for sheet in &created.sheets {
            let grid = sheet.properties.grid_properties.as_ref().unwrap();
            assert_eq!(Some(1), grid.frozen_row_count);
        }
    }

    #[tokio::test]
    async fn stale_id_recreates_spreadsheet() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.write("deleted-spreadsheet").unwrap();

        let raid = RaidSpreadsheet::initialize(FakeGoogle::default(), store.clone())
            .await
            .unwrap();

        assert_eq!(InitState::LocalFileNoRemote, raid.initial_state());
        assert_eq!(
            vec!["file_exists", "create_spreadsheet"],
            raid.client().call_names()
        );

        let stored = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raid.spreadsheet_id(), stored);
        assert!(!stored.contains("deleted-spreadsheet"));

        // Header rows are ready for the first populate.
        assert_eq!(1, raid.champion_rows().len());
        assert_eq!(1, raid.skill_rows().len());
    }

    #[tokio::test]
    async fn existing_spreadsheet_is_reused() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.write("live-spreadsheet").unwrap();

        let fake = FakeGoogle::default();
        fake.insert_spreadsheet("live-spreadsheet", &sheet_specs());

        let raid = RaidSpreadsheet::initialize(fake, store.clone())
            .await
            .unwrap();

        assert_eq!(InitState::LocalFileRemoteExists, raid.initial_state());
        assert_eq!("live-spreadsheet", raid.spreadsheet_id());
        assert_eq!(vec!["file_exists"], raid.client().call_names());
        assert_eq!(1, raid.client().spreadsheet_count());
        assert_eq!(
            "live-spreadsheet",
            fs::read_to_string(store.path()).unwrap()
        );
    }

    #[tokio::test]
    async fn empty_id_file_recreates_without_lookup() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.create_empty().unwrap();

        let raid = RaidSpreadsheet::initialize(FakeGoogle::default(), store.clone())
            .await
            .unwrap();

        assert_eq!(InitState::LocalFileNoRemote, raid.initial_state());
        assert_eq!(vec!["create_spreadsheet"], raid.client().call_names());
        assert_eq!(
            Some(raid.spreadsheet_id().to_string()),
            store.read().unwrap()
        );
    }

    #[tokio::test]
    async fn failed_creation_aborts() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let fake = FakeGoogle::default();
        fake.fail_on("create_spreadsheet");

        let err = RaidSpreadsheet::initialize(fake, store.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, RaidSheetsError::Sheets(_)));

        // The file exists but holds no id.
        assert_eq!(Some(String::new()), store.read().unwrap());
    }

    #[tokio::test]
    async fn failed_existence_check_aborts() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.write("some-id").unwrap();

        let fake = FakeGoogle::default();
        fake.fail_on("file_exists");

        let err = RaidSpreadsheet::initialize(fake, store.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, RaidSheetsError::Sheets(_)));
        assert_eq!(Some("some-id".to_string()), store.read().unwrap());
    }

    #[tokio::test]
    async fn populate_writes_header_then_rows() {
        let dir = tempdir().unwrap();
        let mut raid = RaidSpreadsheet::initialize(FakeGoogle::default(), store_in(&dir))
            .await
            .unwrap();

        assert!(raid.add_champion(&kael()));
        assert!(!raid.add_champion(&Champion {
            name: "Hero Template".to_string(),
            ..kael()
        }));
        assert!(raid.add_skill(&Skill::for_champion(
            &kael(),
            "Disintegrate",
            "Attacks all enemies.",
            4,
            None,
        )));

        raid.populate_champions().await.unwrap();
        raid.populate_skills().await.unwrap();

        let id = raid.spreadsheet_id().to_string();
        let champions = raid.client().sheet_values(&id, "Champions");
        assert_eq!(2, champions.len());
        assert_eq!(CellValue::from("Name"), champions[0][0]);
        assert_eq!(14, champions[0].len());
        assert_eq!(CellValue::from("Kael"), champions[1][0]);
        assert_eq!(CellValue::from("Dark Elves"), champions[1][1]);

        let skills = raid.client().sheet_values(&id, "Skills");
        assert_eq!(2, skills.len());
        assert_eq!(
            vec![
                CellValue::from("Disintegrate"),
                CellValue::from("Attacks all enemies."),
                CellValue::from(4_u32),
                CellValue::from(""),
                CellValue::from("Kael"),
            ],
            skills[1]
        );
    }

    #[tokio::test]
    async fn finalize_formats_and_renames() {
        let dir = tempdir().unwrap();
        let mut raid = RaidSpreadsheet::initialize(FakeGoogle::default(), store_in(&dir))
            .await
            .unwrap();
        raid.add_champion(&kael());
        raid.populate_champions().await.unwrap();
        raid.populate_skills().await.unwrap();
        raid.client().clear_calls();

        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        raid.finalize_at(date).await.unwrap();

        let requests = raid.client().batch_requests();
        let kinds: Vec<_> = requests
            .iter()
            .map(|req| match req {
                Request::RepeatCell { .. } => "repeat_cell",
                Request::AddBanding { .. } => "add_banding",
                Request::UpdateBanding { .. } => "update_banding",
                Request::UpdateSpreadsheetProperties { .. } => "rename",
            })
            .collect();
        assert_eq!(
            vec![
                "repeat_cell",
                "add_banding",
                "repeat_cell",
                "add_banding",
                "rename"
            ],
            kinds
        );

        let spreadsheet = raid.client().spreadsheet(raid.spreadsheet_id()).unwrap();
        assert_eq!(
            Some("RSL - Champions' multipliers (last updated: 2026-10-17)".to_string()),
            spreadsheet.properties.title
        );
    }
}
