use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Username already exists")]
    DuplicateUsername,
}

#[derive(Debug, Clone)]
pub struct CaseRow {
    pub id: i64,
    pub crime_type: Option<String>,
    pub location: Option<String>,
    pub time_of_day: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct EvidenceRow {
    pub id: i64,
    pub case_id: i64,
    pub evidence_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportCounts {
    pub total_cases: i64,
    pub open_cases: i64,
    pub total_suspects: i64,
    pub total_evidence: i64,
}

/// Owner of all durable entity state. A single SQLite connection behind a
/// mutex; every request is handled synchronously end-to-end, so the mutex
/// is the only coordination needed.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepositoryError> {
        install_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ---------------- users ----------------

    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, RepositoryError> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3)",
            params![username, password, role],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(RepositoryError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ---------------- cases ----------------

    /// Inserts a case. Status is always initialized to "Open"; callers
    /// cannot supply a different initial value.
    pub fn create_case(
        &self,
        crime_type: Option<&str>,
        location: Option<&str>,
        time_of_day: Option<&str>,
    ) -> Result<i64, RepositoryError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO cases (crime_type, location, time_of_day, status)
             VALUES (?1, ?2, ?3, 'Open')",
            params![crime_type, location, time_of_day],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_cases(&self) -> Result<Vec<CaseRow>, RepositoryError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, crime_type, location, time_of_day, status FROM cases ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CaseRow {
                    id: row.get(0)?,
                    crime_type: row.get(1)?,
                    location: row.get(2)?,
                    time_of_day: row.get(3)?,
                    status: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn case_exists(&self, case_id: i64) -> Result<bool, RepositoryError> {
        let conn = self.conn();
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM cases WHERE id = ?1",
                params![case_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Deletes a case and, through the FK cascade, every evidence record
    /// that references it. Returns false when the id resolves to nothing.
    pub fn delete_case(&self, case_id: i64) -> Result<bool, RepositoryError> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM cases WHERE id = ?1", params![case_id])?;
        Ok(deleted > 0)
    }

    // ---------------- suspects ----------------

    pub fn create_suspect(
        &self,
        name: &str,
        criminal_history: &str,
    ) -> Result<i64, RepositoryError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO suspects (name, criminal_history) VALUES (?1, ?2)",
            params![name, criminal_history],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn delete_suspect(&self, suspect_id: i64) -> Result<bool, RepositoryError> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM suspects WHERE id = ?1", params![suspect_id])?;
        Ok(deleted > 0)
    }

    // ---------------- evidence ----------------

    pub fn create_evidence(
        &self,
        case_id: i64,
        evidence_type: Option<&str>,
        description: Option<&str>,
    ) -> Result<i64, RepositoryError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO evidence (case_id, evidence_type, description) VALUES (?1, ?2, ?3)",
            params![case_id, evidence_type, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_evidence_for_case(
        &self,
        case_id: i64,
    ) -> Result<Vec<EvidenceRow>, RepositoryError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, case_id, evidence_type, description FROM evidence
             WHERE case_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![case_id], |row| {
                Ok(EvidenceRow {
                    id: row.get(0)?,
                    case_id: row.get(1)?,
                    evidence_type: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete_evidence(&self, evidence_id: i64) -> Result<bool, RepositoryError> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM evidence WHERE id = ?1", params![evidence_id])?;
        Ok(deleted > 0)
    }

    // ---------------- reporting ----------------

    /// Computes all four aggregates fresh; nothing is cached.
    pub fn report_counts(&self) -> Result<ReportCounts, RepositoryError> {
        let conn = self.conn();
        let total_cases = conn.query_row("SELECT COUNT(*) FROM cases", [], |row| row.get(0))?;
        let open_cases = conn.query_row(
            "SELECT COUNT(*) FROM cases WHERE status = 'Open'",
            [],
            |row| row.get(0),
        )?;
        let total_suspects =
            conn.query_row("SELECT COUNT(*) FROM suspects", [], |row| row.get(0))?;
        let total_evidence =
            conn.query_row("SELECT COUNT(*) FROM evidence", [], |row| row.get(0))?;
        Ok(ReportCounts {
            total_cases,
            open_cases,
            total_suspects,
            total_evidence,
        })
    }
}

fn install_schema(conn: &Connection) -> Result<(), RepositoryError> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          username TEXT NOT NULL UNIQUE,
          password TEXT NOT NULL,
          role TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cases (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          crime_type TEXT,
          location TEXT,
          time_of_day TEXT,
          status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS suspects (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          criminal_history TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS evidence (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          case_id INTEGER NOT NULL REFERENCES cases(id) ON DELETE CASCADE,
          evidence_type TEXT,
          description TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_evidence_case ON evidence(case_id);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> SqliteRepository {
        SqliteRepository::open_in_memory().unwrap()
    }

    #[test]
    fn create_case_initializes_status_open() {
        let repo = repo();
        let id = repo
            .create_case(Some("theft"), Some("downtown"), Some("night"))
            .unwrap();
        let cases = repo.list_cases().unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id, id);
        assert_eq!(cases[0].status, "Open");
    }

    #[test]
    fn create_case_accepts_missing_fields_as_null() {
        let repo = repo();
        repo.create_case(None, Some("park"), None).unwrap();
        let cases = repo.list_cases().unwrap();
        assert_eq!(cases[0].crime_type, None);
        assert_eq!(cases[0].location.as_deref(), Some("park"));
        assert_eq!(cases[0].time_of_day, None);
    }

    #[test]
    fn delete_case_cascades_to_evidence() {
        let repo = repo();
        let case_id = repo
            .create_case(Some("burglary"), Some("suburbs"), Some("evening"))
            .unwrap();
        for i in 0..3 {
            repo.create_evidence(case_id, Some("fingerprint"), Some(&format!("item {i}")))
                .unwrap();
        }
        assert_eq!(repo.list_evidence_for_case(case_id).unwrap().len(), 3);

        assert!(repo.delete_case(case_id).unwrap());
        assert!(repo.list_evidence_for_case(case_id).unwrap().is_empty());
        assert_eq!(repo.report_counts().unwrap().total_evidence, 0);
    }

    #[test]
    fn delete_missing_rows_reports_false() {
        let repo = repo();
        assert!(!repo.delete_case(99).unwrap());
        assert!(!repo.delete_suspect(99).unwrap());
        assert!(!repo.delete_evidence(99).unwrap());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let repo = repo();
        repo.create_user("alice", "secret", "admin").unwrap();
        let err = repo.create_user("alice", "other", "analyst").unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateUsername));
    }

    #[test]
    fn nothing_prevents_duplicate_cases_or_suspects() {
        let repo = repo();
        repo.create_case(Some("theft"), Some("mall"), Some("noon"))
            .unwrap();
        repo.create_case(Some("theft"), Some("mall"), Some("noon"))
            .unwrap();
        repo.create_suspect("John Doe", "none").unwrap();
        repo.create_suspect("John Doe", "none").unwrap();
        let counts = repo.report_counts().unwrap();
        assert_eq!(counts.total_cases, 2);
        assert_eq!(counts.total_suspects, 2);
    }

    #[test]
    fn report_counts_track_open_status() {
        let repo = repo();
        repo.create_case(Some("fraud"), Some("downtown"), Some("morning"))
            .unwrap();
        let second = repo
            .create_case(Some("theft"), Some("mall"), Some("night"))
            .unwrap();
        repo.create_suspect("Jane Roe", "prior theft conviction")
            .unwrap();
        repo.create_evidence(second, Some("cctv"), Some("entrance camera"))
            .unwrap();

        let counts = repo.report_counts().unwrap();
        assert_eq!(counts.total_cases, 2);
        assert_eq!(counts.open_cases, 2);
        assert_eq!(counts.total_suspects, 1);
        assert_eq!(counts.total_evidence, 1);
    }
}
