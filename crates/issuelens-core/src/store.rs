// SPDX-License-Identifier: Apache-2.0

//! SQLite-backed analysis cache.
//!
//! One row per `(repo_url, issue_number)`. Rows are written once and never
//! updated or deleted; a unique index arbitrates concurrent first inserts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::Result;
use crate::ai::types::{Analysis, IssueType};
use crate::error::IssueLensError;
use crate::github::IssueRef;

/// A persisted analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    /// Surrogate key, increasing with insertion order.
    pub id: i64,
    /// Repository URL exactly as requested.
    pub repo_url: String,
    /// Issue number.
    pub issue_number: u64,
    /// Analysis summary.
    pub summary: String,
    /// Analysis type.
    pub issue_type: IssueType,
    /// Priority 1-5.
    pub priority_score: u8,
    /// Labels joined with commas.
    pub suggested_labels: String,
    /// Potential impact.
    pub potential_impact: String,
    /// Canonical serialized [`Analysis`].
    pub full_json: String,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Labels split back into a list.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        split_labels(&self.suggested_labels)
    }

    /// Deserializes the stored analysis.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if `full_json` is not a valid analysis.
    pub fn analysis(&self) -> Result<Analysis> {
        serde_json::from_str(&self.full_json).map_err(|e| IssueLensError::Storage {
            message: format!("corrupt full_json for record {}: {e}", self.id),
        })
    }
}

/// Persistence for analyses.
pub trait AnalysisStore: Send + Sync {
    /// Looks up the analysis for an exact `(repo_url, issue_number)` match.
    fn find(&self, issue: &IssueRef) -> Result<Option<AnalysisRecord>>;

    /// Persists a new analysis and returns the stored record.
    ///
    /// If a record for `issue` already exists, that record is returned
    /// unchanged.
    fn insert(&self, issue: &IssueRef, analysis: &Analysis) -> Result<AnalysisRecord>;

    /// All records, newest first; ties in insertion order.
    fn history(&self) -> Result<Vec<AnalysisRecord>>;
}

/// [`AnalysisStore`] in a SQLite file.
#[derive(Debug)]
pub struct SqliteAnalysisStore {
    db_path: PathBuf,
}

const SELECT_COLUMNS: &str = "SELECT id, repo_url, issue_number, summary, type, priority_score, \
     suggested_labels, potential_impact, full_json, created_at FROM issueanalysis";

impl SqliteAnalysisStore {
    /// Opens the store at `path`, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the file or schema cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| IssueLensError::Storage {
                message: format!("cannot create {}: {e}", parent.display()),
            })?;
        }

        let store = Self { db_path };
        let connection = store.open_connection()?;
        initialize_schema(&connection)?;
        debug!(path = %store.db_path.display(), "Opened analysis store");
        Ok(store)
    }

    /// Opens the store described by a database URL.
    ///
    /// # Errors
    ///
    /// Returns `Config` for unsupported URLs and `Storage` if opening fails.
    pub fn from_url(url: &str) -> Result<Self> {
        Self::new(sqlite_path_from_url(url)?)
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open_connection(&self) -> Result<Connection> {
        let connection = Connection::open(&self.db_path)?;
        connection.busy_timeout(Duration::from_secs(5))?;
        connection.execute_batch(
            r"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;
        Ok(connection)
    }
}

impl AnalysisStore for SqliteAnalysisStore {
    fn find(&self, issue: &IssueRef) -> Result<Option<AnalysisRecord>> {
        let connection = self.open_connection()?;
        find_record(&connection, issue)
    }

    fn insert(&self, issue: &IssueRef, analysis: &Analysis) -> Result<AnalysisRecord> {
        let full_json = serde_json::to_string(analysis).map_err(|e| IssueLensError::Storage {
            message: format!("cannot serialize analysis: {e}"),
        })?;
        let created_at = timestamp_to_db(Utc::now());

        let connection = self.open_connection()?;
        let inserted = connection.execute(
            r"
            INSERT INTO issueanalysis (
                repo_url, issue_number, summary, type, priority_score,
                suggested_labels, potential_impact, full_json, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(repo_url, issue_number) DO NOTHING
            ",
            params![
                issue.repo_url(),
                issue_number_to_db(issue.issue_number())?,
                analysis.summary,
                analysis.issue_type.as_str(),
                analysis.priority_score,
                analysis.suggested_labels.join(","),
                analysis.potential_impact,
                full_json,
                created_at,
            ],
        )?;

        if inserted == 0 {
            info!(issue = %issue, "Analysis already stored, keeping existing record");
        } else {
            info!(issue = %issue, "Stored analysis");
        }

        find_record(&connection, issue)?.ok_or_else(|| IssueLensError::Storage {
            message: format!("record for {issue} missing after insert"),
        })
    }

    fn history(&self) -> Result<Vec<AnalysisRecord>> {
        let connection = self.open_connection()?;
        let mut statement = connection.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let rows = statement.query_map([], RawRecord::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        // Sorted on parsed timestamps: legacy rows use a different text layout.
        // The sort is stable, so ties keep id order.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(count = records.len(), "Loaded history");
        Ok(records)
    }
}

fn initialize_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS issueanalysis (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            repo_url TEXT NOT NULL,
            issue_number INTEGER NOT NULL,
            summary TEXT NOT NULL,
            type TEXT NOT NULL,
            priority_score INTEGER NOT NULL,
            suggested_labels TEXT NOT NULL,
            potential_impact TEXT NOT NULL,
            full_json TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_issueanalysis_ref
            ON issueanalysis (repo_url, issue_number);
        ",
    )?;
    Ok(())
}

fn find_record(connection: &Connection, issue: &IssueRef) -> Result<Option<AnalysisRecord>> {
    connection
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE repo_url = ?1 AND issue_number = ?2"),
            params![issue.repo_url(), issue_number_to_db(issue.issue_number())?],
            RawRecord::from_row,
        )
        .optional()?
        .map(RawRecord::into_record)
        .transpose()
}

/// Row as SQLite returns it, before domain conversion.
struct RawRecord {
    id: i64,
    repo_url: String,
    issue_number: i64,
    summary: String,
    issue_type: String,
    priority_score: i64,
    suggested_labels: String,
    potential_impact: String,
    full_json: String,
    created_at: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            repo_url: row.get(1)?,
            issue_number: row.get(2)?,
            summary: row.get(3)?,
            issue_type: row.get(4)?,
            priority_score: row.get(5)?,
            suggested_labels: row.get(6)?,
            potential_impact: row.get(7)?,
            full_json: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn into_record(self) -> Result<AnalysisRecord> {
        let corrupt = |field: &str, detail: String| IssueLensError::Storage {
            message: format!("invalid {field} in record {}: {detail}", self.id),
        };

        Ok(AnalysisRecord {
            id: self.id,
            issue_number: u64::try_from(self.issue_number)
                .map_err(|e| corrupt("issue_number", e.to_string()))?,
            issue_type: self
                .issue_type
                .parse()
                .map_err(|e: String| corrupt("type", e))?,
            priority_score: u8::try_from(self.priority_score)
                .map_err(|e| corrupt("priority_score", e.to_string()))?,
            created_at: timestamp_from_db(&self.created_at)
                .map_err(|e| corrupt("created_at", e.to_string()))?,
            repo_url: self.repo_url,
            summary: self.summary,
            suggested_labels: self.suggested_labels,
            potential_impact: self.potential_impact,
            full_json: self.full_json,
        })
    }
}

/// Resolves a database URL to a file path.
///
/// Accepts `sqlite://path`, `sqlite:path`, or a bare path. Query parameters
/// are ignored.
///
/// # Errors
///
/// Returns `Config` for other URL schemes or an empty path.
pub fn sqlite_path_from_url(url: &str) -> Result<PathBuf> {
    let without_query = url.split('?').next().unwrap_or_default();
    let path = if let Some(rest) = without_query.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = without_query.strip_prefix("sqlite:") {
        rest
    } else if without_query.contains("://") {
        return Err(IssueLensError::Config {
            message: format!("unsupported database URL '{url}', expected sqlite://path"),
        });
    } else {
        without_query
    };

    if path.is_empty() {
        return Err(IssueLensError::Config {
            message: format!("database URL '{url}' has no path"),
        });
    }
    Ok(PathBuf::from(path))
}

/// Splits a comma-joined label string, dropping empty entries.
#[must_use]
pub fn split_labels(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

fn issue_number_to_db(number: u64) -> Result<i64> {
    i64::try_from(number).map_err(|_| IssueLensError::InvalidReference {
        message: format!("issue number {number} is too large"),
    })
}

const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn timestamp_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp.
///
/// Rows written by the earlier service hold naive UTC values such as
/// `2025-06-01 12:00:00.123456`.
fn timestamp_from_db(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, LEGACY_TIMESTAMP_FORMAT).map(|dt| dt.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn analysis(summary: &str) -> Analysis {
        Analysis {
            summary: summary.to_string(),
            issue_type: IssueType::Bug,
            priority_score: 3,
            suggested_labels: vec!["bug".to_string(), "good first issue".to_string()],
            potential_impact: "Editor users".to_string(),
        }
    }

    fn issue(number: u64) -> IssueRef {
        IssueRef::new("https://github.com/acme/widgets", number).unwrap()
    }

    #[test]
    fn test_find_returns_none_when_empty() {
        let temp = tempdir().expect("create tempdir");
        let store = SqliteAnalysisStore::new(temp.path().join("db.sqlite3")).unwrap();

        assert!(store.find(&issue(1)).unwrap().is_none());
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn test_insert_then_find_round_trips() {
        let temp = tempdir().expect("create tempdir");
        let store = SqliteAnalysisStore::new(temp.path().join("db.sqlite3")).unwrap();

        let stored = store.insert(&issue(42), &analysis("Crash on save")).unwrap();
        let found = store.find(&issue(42)).unwrap().expect("record");

        assert_eq!(found, stored);
        assert_eq!(found.suggested_labels, "bug,good first issue");
        assert_eq!(found.labels(), vec!["bug", "good first issue"]);
        assert_eq!(found.analysis().unwrap(), analysis("Crash on save"));
        assert_eq!(
            found.full_json,
            serde_json::to_string(&analysis("Crash on save")).unwrap()
        );
    }

    #[test]
    fn test_find_does_not_normalize_urls() {
        let temp = tempdir().expect("create tempdir");
        let store = SqliteAnalysisStore::new(temp.path().join("db.sqlite3")).unwrap();
        store.insert(&issue(42), &analysis("a")).unwrap();

        let trailing = IssueRef::new("https://github.com/acme/widgets/", 42).unwrap();
        assert!(store.find(&trailing).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_keeps_first_record() {
        let temp = tempdir().expect("create tempdir");
        let store = SqliteAnalysisStore::new(temp.path().join("db.sqlite3")).unwrap();

        let first = store.insert(&issue(7), &analysis("first")).unwrap();
        let second = store.insert(&issue(7), &analysis("second")).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.summary, "first");
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[test]
    fn test_history_is_newest_first() {
        let temp = tempdir().expect("create tempdir");
        let store = SqliteAnalysisStore::new(temp.path().join("db.sqlite3")).unwrap();

        store.insert(&issue(1), &analysis("one")).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        store.insert(&issue(2), &analysis("two")).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        store.insert(&issue(3), &analysis("three")).unwrap();

        let numbers: Vec<u64> = store
            .history()
            .unwrap()
            .iter()
            .map(|r| r.issue_number)
            .collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp = tempdir().expect("create tempdir");
        let path = temp.path().join("nested").join("db.sqlite3");

        SqliteAnalysisStore::new(&path)
            .unwrap()
            .insert(&issue(9), &analysis("persisted"))
            .unwrap();

        let reopened = SqliteAnalysisStore::new(&path).unwrap();
        assert_eq!(reopened.find(&issue(9)).unwrap().unwrap().summary, "persisted");
    }

    /// Writes a row directly, bypassing `insert`, with a chosen timestamp.
    fn insert_raw(path: &Path, number: u64, summary: &str, created_at: &str) {
        let connection = Connection::open(path).unwrap();
        let full_json = serde_json::to_string(&analysis(summary)).unwrap();
        connection
            .execute(
                "INSERT INTO issueanalysis (repo_url, issue_number, summary, type, \
                 priority_score, suggested_labels, potential_impact, full_json, created_at) \
                 VALUES ('https://github.com/acme/widgets', ?1, ?2, 'bug', 3, 'bug', \
                 'Editor users', ?3, ?4)",
                params![i64::try_from(number).unwrap(), summary, full_json, created_at],
            )
            .unwrap();
    }

    fn history_numbers(store: &SqliteAnalysisStore) -> Vec<u64> {
        store
            .history()
            .unwrap()
            .iter()
            .map(|r| r.issue_number)
            .collect()
    }

    #[test]
    fn test_history_ties_keep_insertion_order() {
        let temp = tempdir().expect("create tempdir");
        let path = temp.path().join("db.sqlite3");
        let store = SqliteAnalysisStore::new(&path).unwrap();

        let stamp = "2026-03-01T10:00:00.000000Z";
        insert_raw(&path, 5, "five", stamp);
        insert_raw(&path, 2, "two", stamp);
        insert_raw(&path, 9, "nine", stamp);

        assert_eq!(history_numbers(&store), vec![5, 2, 9]);
    }

    #[test]
    fn test_history_orders_by_timestamp_not_insertion() {
        let temp = tempdir().expect("create tempdir");
        let path = temp.path().join("db.sqlite3");
        let store = SqliteAnalysisStore::new(&path).unwrap();

        insert_raw(&path, 1, "middle", "2026-03-02T00:00:00.000000Z");
        insert_raw(&path, 2, "oldest", "2026-03-01T00:00:00.000000Z");
        insert_raw(&path, 3, "newest", "2026-03-03T00:00:00.000000Z");
        insert_raw(&path, 4, "tie with middle", "2026-03-02T00:00:00.000000Z");

        assert_eq!(history_numbers(&store), vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_legacy_rows_are_readable() {
        let temp = tempdir().expect("create tempdir");
        let path = temp.path().join("db.sqlite3");
        {
            // Table as the earlier service created it: no unique index.
            let connection = Connection::open(&path).unwrap();
            connection
                .execute_batch(
                    "CREATE TABLE issueanalysis (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        repo_url VARCHAR NOT NULL,
                        issue_number INTEGER NOT NULL,
                        summary VARCHAR NOT NULL,
                        type VARCHAR NOT NULL,
                        priority_score INTEGER NOT NULL,
                        suggested_labels VARCHAR NOT NULL,
                        potential_impact VARCHAR NOT NULL,
                        full_json VARCHAR NOT NULL,
                        created_at DATETIME NOT NULL
                    );",
                )
                .unwrap();
        }
        insert_raw(&path, 1, "legacy", "2025-06-01 12:00:00.123456");

        let store = SqliteAnalysisStore::new(&path).unwrap();
        let found = store.find(&issue(1)).unwrap().expect("legacy record");
        assert_eq!(found.summary, "legacy");
        assert_eq!(
            found.created_at,
            DateTime::parse_from_rfc3339("2025-06-01T12:00:00.123456Z")
                .unwrap()
                .with_timezone(&Utc)
        );

        store.insert(&issue(2), &analysis("fresh")).unwrap();
        assert_eq!(history_numbers(&store), vec![2, 1]);
    }

    #[test]
    fn test_created_at_is_fixed_width_utc() {
        let stamp = timestamp_to_db(Utc::now());
        assert_eq!(stamp.len(), "2026-01-01T00:00:00.000000Z".len());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn test_sqlite_url_forms() {
        assert_eq!(
            sqlite_path_from_url("sqlite://./db.sqlite3").unwrap(),
            PathBuf::from("./db.sqlite3")
        );
        assert_eq!(
            sqlite_path_from_url("sqlite:///var/lib/issuelens.db?mode=rwc").unwrap(),
            PathBuf::from("/var/lib/issuelens.db")
        );
        assert_eq!(
            sqlite_path_from_url("sqlite:data.db").unwrap(),
            PathBuf::from("data.db")
        );
        assert_eq!(
            sqlite_path_from_url("data.db").unwrap(),
            PathBuf::from("data.db")
        );
        assert!(sqlite_path_from_url("postgres://localhost/db").is_err());
        assert!(sqlite_path_from_url("sqlite://").is_err());
    }

    #[test]
    fn test_split_labels_drops_empty_entries() {
        assert_eq!(split_labels("bug, UI,,"), vec!["bug", "UI"]);
        assert!(split_labels("").is_empty());
    }
}
