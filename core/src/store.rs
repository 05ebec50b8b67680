//! SQLite-backed dataset snapshot.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods; nothing else executes SQL.
//!
//! The database is always in-memory. It holds the two raw sources of the
//! currently loaded dataset and performs the trip/patron join.

use crate::{
    error::PromoResult,
    loader::RawSources,
    types::PatronRecord,
};
use rusqlite::{params, Connection};

pub struct DatasetStore {
    conn: Connection,
}

impl DatasetStore {
    /// Open an in-memory database.
    pub fn in_memory() -> PromoResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PromoResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_dataset.sql"))?;
        Ok(())
    }

    /// Replace the loaded sources. The previous snapshot is discarded.
    pub fn replace_sources(&mut self, raw: &RawSources) -> PromoResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM trip", [])?;
        tx.execute("DELETE FROM patron", [])?;
        {
            let mut insert_trip = tx.prepare(
                "INSERT INTO trip (row_num, patron_id, property_id, trips, coin_in)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (i, row) in raw.trips.iter().enumerate() {
                insert_trip.execute(params![
                    i as i64,
                    row.patron_id,
                    row.property_id,
                    row.trips,
                    row.coin_in,
                ])?;
            }

            let mut insert_patron = tx.prepare(
                "INSERT INTO patron (row_num, patron_id, property_id, attributes)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (i, row) in raw.patrons.iter().enumerate() {
                insert_patron.execute(params![
                    i as i64,
                    row.patron_id,
                    row.property_id,
                    serde_json::to_string(&row.attributes)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Inner join of trip and patron rows on (patron_id, property_id).
    /// Trip rows without a patron match are dropped; duplicate keys multiply.
    pub fn merged_records(&self) -> PromoResult<Vec<PatronRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.patron_id, t.property_id, t.trips, t.coin_in
             FROM trip t
             INNER JOIN patron p
                 ON p.patron_id = t.patron_id AND p.property_id = t.property_id
             ORDER BY t.row_num ASC, p.row_num ASC",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(PatronRecord::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn trip_count(&self) -> PromoResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM trip", [], |row| row.get(0))?;
        Ok(n)
    }

    pub fn patron_count(&self) -> PromoResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM patron", [], |row| row.get(0))?;
        Ok(n)
    }

    /// Trip rows with no matching patron row.
    pub fn unmatched_trip_count(&self) -> PromoResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM trip t
             WHERE NOT EXISTS (
                 SELECT 1 FROM patron p
                 WHERE p.patron_id = t.patron_id AND p.property_id = t.property_id
             )",
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
