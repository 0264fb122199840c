use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use log::warn;
use rusqlite::{Connection, OptionalExtension, params};

use crate::config::app_cache_dir;
use crate::h2h::{BaselineRecord, BaselineSource, H2hBaseline, pair_key};
use crate::match_log::{Match, parse_match_date};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("matches.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            match_id INTEGER PRIMARY KEY AUTOINCREMENT,
            round INTEGER NULL,
            match_date TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_goals INTEGER NULL,
            away_goals INTEGER NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(home_team, away_team)
        );
        CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date);
        CREATE INDEX IF NOT EXISTS idx_matches_round ON matches(round);

        CREATE TABLE IF NOT EXISTS h2h_baseline (
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            wins_team1 INTEGER NOT NULL,
            wins_team2 INTEGER NOT NULL,
            draws INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (team1, team2)
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Inserts or refreshes every match. A league season meets each home/away pair
/// once, so the pair is the key and a rescheduled fixture replaces its old row.
/// Returns the number of rows written.
pub fn upsert_matches(conn: &mut Connection, matches: &[Match]) -> Result<usize> {
    let tx = conn.transaction().context("begin match upsert")?;
    let now = Utc::now().to_rfc3339();
    for m in matches {
        tx.execute(
            r#"
            INSERT INTO matches (
                round, match_date, home_team, away_team, home_goals, away_goals, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(home_team, away_team) DO UPDATE SET
                round = excluded.round,
                match_date = excluded.match_date,
                home_goals = excluded.home_goals,
                away_goals = excluded.away_goals,
                updated_at = excluded.updated_at
            "#,
            params![
                m.round,
                m.date.format(DATE_FORMAT).to_string(),
                m.home_team,
                m.away_team,
                m.home_goals,
                m.away_goals,
                now,
            ],
        )
        .context("upsert match")?;
    }
    tx.commit().context("commit match upsert")?;
    Ok(matches.len())
}

/// Whole log in chronological order, insertion order breaking ties.
pub fn load_matches(conn: &Connection) -> Result<Vec<Match>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT round, match_date, home_team, away_team, home_goals, away_goals
            FROM matches
            ORDER BY match_date ASC, match_id ASC
            "#,
        )
        .context("prepare load matches query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, Option<i64>>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<u32>>(4)?,
                row.get::<_, Option<u32>>(5)?,
            ))
        })
        .context("query load matches")?;

    let mut out = Vec::new();
    for row in rows {
        let (round, raw_date, home_team, away_team, home_goals, away_goals) =
            row.context("decode match row")?;
        let Some(date) = parse_match_date(&raw_date) else {
            warn!("dropping stored match with unreadable date {raw_date:?}");
            continue;
        };
        out.push(Match {
            round,
            date,
            home_team,
            away_team,
            home_goals,
            away_goals,
        });
    }
    Ok(out)
}

pub fn upsert_baseline(conn: &mut Connection, baseline: &H2hBaseline) -> Result<usize> {
    let tx = conn.transaction().context("begin baseline upsert")?;
    let now = Utc::now().to_rfc3339();
    let mut written = 0usize;
    for r in baseline.records() {
        tx.execute(
            r#"
            INSERT INTO h2h_baseline (team1, team2, wins_team1, wins_team2, draws, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(team1, team2) DO UPDATE SET
                wins_team1 = excluded.wins_team1,
                wins_team2 = excluded.wins_team2,
                draws = excluded.draws,
                updated_at = excluded.updated_at
            "#,
            params![r.team1, r.team2, r.wins_team1, r.wins_team2, r.draws, now],
        )
        .context("upsert baseline record")?;
        written += 1;
    }
    tx.commit().context("commit baseline upsert")?;
    Ok(written)
}

pub fn load_baseline(conn: &Connection) -> Result<H2hBaseline> {
    let mut stmt = conn
        .prepare("SELECT team1, team2, wins_team1, wins_team2, draws FROM h2h_baseline")
        .context("prepare load baseline query")?;
    let rows = stmt
        .query_map([], decode_baseline)
        .context("query load baseline")?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row.context("decode baseline row")?);
    }
    Ok(H2hBaseline::from_records(records))
}

pub fn lookup_baseline(conn: &Connection, team_a: &str, team_b: &str) -> Result<Option<BaselineRecord>> {
    let (team1, team2) = pair_key(team_a, team_b);
    conn.query_row(
        r#"
        SELECT team1, team2, wins_team1, wins_team2, draws
        FROM h2h_baseline
        WHERE team1 = ?1 AND team2 = ?2
        "#,
        params![team1, team2],
        decode_baseline,
    )
    .optional()
    .context("query baseline pair")
}

fn decode_baseline(row: &rusqlite::Row<'_>) -> rusqlite::Result<BaselineRecord> {
    Ok(BaselineRecord {
        team1: row.get(0)?,
        team2: row.get(1)?,
        wins_team1: row.get(2)?,
        wins_team2: row.get(3)?,
        draws: row.get(4)?,
    })
}

impl BaselineSource for Connection {
    fn lookup(&self, team_a: &str, team_b: &str) -> Option<BaselineRecord> {
        match lookup_baseline(self, team_a, team_b) {
            Ok(record) => record,
            Err(err) => {
                warn!("baseline lookup failed for {team_a} vs {team_b}: {err:#}");
                None
            }
        }
    }
}
