use super::{
    Cursor, MatchIdentity, MatchLifecycle, MatchProgress, MatchRecord, SeenEventIds, TeamDisplay,
};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MatchRow {
    pub match_id: String,
    pub competition_id: String,
    pub season_id: String,
    pub stage_id: String,
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_team_abbrev: String,
    pub away_team_abbrev: String,
    pub cursor: String,
    pub seen_event_ids: Vec<String>,
    pub lifecycle: MatchLifecycle,
    pub version: i64,
    pub registered_at: time::PrimitiveDateTime,
}

impl From<MatchRow> for MatchRecord {
    fn from(row: MatchRow) -> Self {
        Self {
            identity: MatchIdentity {
                competition_id: row.competition_id,
                season_id: row.season_id,
                stage_id: row.stage_id,
                match_id: row.match_id,
            },
            teams: TeamDisplay {
                home_team_name: row.home_team_name,
                away_team_name: row.away_team_name,
                home_team_abbrev: row.home_team_abbrev,
                away_team_abbrev: row.away_team_abbrev,
            },
            cursor: Cursor::from(row.cursor),
            seen: row.seen_event_ids.into_iter().collect(),
            lifecycle: row.lifecycle,
            version: row.version,
            registered_at: row.registered_at,
        }
    }
}

const MATCH_COLUMNS: &str = r#"
    match_id,
    competition_id,
    season_id,
    stage_id,
    home_team_name,
    away_team_name,
    home_team_abbrev,
    away_team_abbrev,
    cursor,
    seen_event_ids,
    lifecycle,
    version,
    registered_at
"#;

#[derive(Debug, Clone)]
/// Fetch one match record by id.
pub struct GetMatchRecord {
    pub match_id: String,
}

impl Processor<GetMatchRecord> for DatabaseProcessor {
    type Output = Option<MatchRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetMatchRecord")]
    async fn process(&self, query: GetMatchRecord) -> Result<Option<MatchRecord>, sqlx::Error> {
        let sql = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = $1");
        let row = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(query.match_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(MatchRecord::from))
    }
}

#[derive(Debug, Clone)]
/// Check whether a match is registered.
pub struct MatchRecordExists {
    pub match_id: String,
}

impl Processor<MatchRecordExists> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MatchRecordExists")]
    async fn process(&self, query: MatchRecordExists) -> Result<bool, sqlx::Error> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM matches WHERE match_id = $1)",
        )
        .bind(query.match_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[derive(Debug, Clone)]
/// Insert a freshly discovered match.
///
/// Uses ON CONFLICT DO NOTHING so two scanners racing on the same match
/// leave exactly one record. Returns whether this call inserted it.
pub struct InsertMatchRecord {
    pub record: MatchRecord,
}

impl Processor<InsertMatchRecord> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertMatchRecord")]
    async fn process(&self, insert: InsertMatchRecord) -> Result<bool, sqlx::Error> {
        let MatchRecord {
            identity,
            teams,
            cursor,
            seen,
            lifecycle,
            version,
            registered_at,
        } = insert.record;
        let result = sqlx::query(
            r#"
            INSERT INTO matches (
                match_id, competition_id, season_id, stage_id,
                home_team_name, away_team_name, home_team_abbrev, away_team_abbrev,
                cursor, seen_event_ids, lifecycle, version, registered_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (match_id) DO NOTHING
            "#,
        )
        .bind(identity.match_id)
        .bind(identity.competition_id)
        .bind(identity.season_id)
        .bind(identity.stage_id)
        .bind(teams.home_team_name)
        .bind(teams.away_team_name)
        .bind(teams.home_team_abbrev)
        .bind(teams.away_team_abbrev)
        .bind(String::from(cursor))
        .bind(Vec::<String>::from(seen))
        .bind(lifecycle)
        .bind(version)
        .bind(registered_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[derive(Debug, Clone)]
/// Conditionally write polling progress.
///
/// The row is only touched if its version still equals
/// `progress.expected_version`. Returns the number of rows updated, so `0`
/// means either the match is gone or another poll got there first.
pub struct UpdateMatchProgress {
    pub match_id: String,
    pub progress: MatchProgress,
}

impl Processor<UpdateMatchProgress> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateMatchProgress")]
    async fn process(&self, cmd: UpdateMatchProgress) -> Result<u64, sqlx::Error> {
        let MatchProgress {
            cursor,
            seen,
            lifecycle,
            expected_version,
        } = cmd.progress;
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET cursor = $2,
                seen_event_ids = $3,
                lifecycle = $4,
                version = version + 1
            WHERE match_id = $1 AND version = $5
            "#,
        )
        .bind(cmd.match_id)
        .bind(String::from(cursor))
        .bind(Vec::<String>::from(seen))
        .bind(lifecycle)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// Remove a match record. Returns whether a row was deleted.
pub struct DeleteMatchRecord {
    pub match_id: String,
}

impl Processor<DeleteMatchRecord> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteMatchRecord")]
    async fn process(&self, cmd: DeleteMatchRecord) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM matches WHERE match_id = $1")
            .bind(cmd.match_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, Default)]
/// List every record still being polled, oldest registration first.
/// `done` rows stay listed until their delete goes through.
pub struct ListLiveMatches;

impl Processor<ListLiveMatches> for DatabaseProcessor {
    type Output = Vec<MatchRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListLiveMatches")]
    async fn process(&self, _query: ListLiveMatches) -> Result<Vec<MatchRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM matches \
             WHERE lifecycle <> 'deleted' \
             ORDER BY registered_at ASC"
        );
        let rows = sqlx::query_as::<_, MatchRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }
}
