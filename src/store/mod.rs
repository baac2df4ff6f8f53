//! Sqlite-backed persistent store.
//!
//! Holds the four tables (`income`, `expenses`, `savings`, `budget`) and
//! every query the service runs against them. The connection lives behind a
//! `tokio::sync::Mutex`; each method locks, runs its statements, and returns
//! before any await point elsewhere can observe partial state.
//!
//! The savings table is conceptually a single current value: every income or
//! expense write recomputes `income - expenses` and replaces the row
//! (delete-all-then-insert). Concurrent writers race with last-writer-wins
//! semantics, which is acceptable for this single-user design. Budget rows
//! are append-only history and are never updated in place.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::budget::BudgetEntry;

/// Failure touching the persistent store. Always fatal to the operation
/// that hit it; the budget pipeline never absorbs these.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// One recorded expense transaction.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseRow {
    pub expenseid: i64,
    pub amount: f64,
    pub category: String,
    pub notes: Option<String>,
    pub date: NaiveDateTime,
}

/// Per-day expense total, ordered by date.
#[derive(Debug, Clone, Serialize)]
pub struct DailyTotal {
    pub date: String,
    pub amount: f64,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS income (
    incomeid   INTEGER PRIMARY KEY AUTOINCREMENT,
    amount     REAL NOT NULL,
    category   TEXT NOT NULL,
    notes      TEXT
);
CREATE TABLE IF NOT EXISTS expenses (
    expenseid        INTEGER PRIMARY KEY AUTOINCREMENT,
    amount           REAL NOT NULL,
    expensecategory  TEXT NOT NULL,
    notes            TEXT,
    expensedate      TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS savings (
    savingsid  INTEGER PRIMARY KEY AUTOINCREMENT,
    amount     REAL NOT NULL,
    notes      TEXT
);
CREATE TABLE IF NOT EXISTS budget (
    budgetid            INTEGER PRIMARY KEY AUTOINCREMENT,
    category            TEXT NOT NULL,
    recommended_amount  REAL NOT NULL,
    current_amount      REAL NOT NULL,
    notes               TEXT
);
"#;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Record an income entry and recompute the cached savings value.
    pub async fn add_income(
        &self,
        amount: f64,
        category: &str,
        notes: Option<&str>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO income (amount, category, notes) VALUES (?1, ?2, ?3)",
            params![amount, category, notes],
        )?;
        recompute_savings(&conn)?;
        Ok(())
    }

    /// Record an expense transaction and recompute the cached savings value.
    pub async fn add_expense(
        &self,
        amount: f64,
        category: &str,
        notes: Option<&str>,
    ) -> Result<(), StoreError> {
        let date = chrono::Utc::now().naive_utc().format(DATE_FORMAT).to_string();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO expenses (amount, expensecategory, notes, expensedate)
             VALUES (?1, ?2, ?3, ?4)",
            params![amount, category, notes, date],
        )?;
        recompute_savings(&conn)?;
        Ok(())
    }

    /// Delete a single expense by primary key. Unknown ids are a no-op.
    pub async fn delete_expense(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM expenses WHERE expenseid = ?1", params![id])?;
        Ok(())
    }

    /// All expense transactions, most recent first.
    pub async fn list_expenses(&self) -> Result<Vec<ExpenseRow>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT expenseid, amount, expensecategory, notes, expensedate
             FROM expenses
             ORDER BY expensedate DESC, expenseid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            let date: String = row.get(4)?;
            Ok(ExpenseRow {
                expenseid: row.get(0)?,
                amount: row.get(1)?,
                category: row.get(2)?,
                notes: row.get(3)?,
                date: NaiveDateTime::parse_from_str(&date, DATE_FORMAT)
                    .unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Per-day expense sums, oldest first.
    pub async fn daily_expense_totals(&self) -> Result<Vec<DailyTotal>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT DATE(expensedate) AS day, SUM(amount)
             FROM expenses
             GROUP BY DATE(expensedate)
             ORDER BY DATE(expensedate)",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DailyTotal {
                date: row.get(0)?,
                amount: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Sum of all recorded income, 0 when empty.
    pub async fn total_income(&self) -> Result<f64, StoreError> {
        let conn = self.conn.lock().await;
        let total = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM income",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Current savings value. Physically a sum over the savings table, which
    /// holds at most one row between recomputes.
    pub async fn total_savings(&self) -> Result<f64, StoreError> {
        let conn = self.conn.lock().await;
        let total = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM savings",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Expense totals grouped by category, largest first.
    pub async fn expenses_by_category(&self) -> Result<Vec<(String, f64)>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT expensecategory, SUM(amount) AS total
             FROM expenses
             GROUP BY expensecategory
             ORDER BY total DESC",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Append budget entries as new rows. Not wrapped in a transaction; a
    /// failure mid-way leaves earlier rows in place (append-only history).
    pub async fn insert_budget_entries(
        &self,
        entries: &[BudgetEntry],
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        for entry in entries {
            conn.execute(
                "INSERT INTO budget (category, recommended_amount, current_amount, notes)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.category,
                    entry.recommended_amount,
                    entry.current_amount,
                    entry.notes
                ],
            )?;
        }
        Ok(())
    }

    /// All stored budget rows in insertion order.
    pub async fn list_budget(&self) -> Result<Vec<BudgetEntry>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT category, current_amount, recommended_amount, notes
             FROM budget
             ORDER BY budgetid",
        )?;
        let rows = stmt.query_map([], |row| {
            let notes: Option<String> = row.get(3)?;
            Ok(BudgetEntry {
                category: row.get(0)?,
                current_amount: row.get(1)?,
                recommended_amount: row.get(2)?,
                notes: notes.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Replace the single savings row with `income - expenses`. Runs inside the
/// caller's connection lock so the delete and insert are not interleaved
/// with other methods of this store.
fn recompute_savings(conn: &Connection) -> Result<(), StoreError> {
    let income: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM income",
        [],
        |row| row.get(0),
    )?;
    let expenses: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM expenses",
        [],
        |row| row.get(0),
    )?;
    conn.execute("DELETE FROM savings", [])?;
    conn.execute(
        "INSERT INTO savings (amount, notes) VALUES (?1, ?2)",
        params![income - expenses, "Automatically calculated savings"],
    )?;
    Ok(())
}
