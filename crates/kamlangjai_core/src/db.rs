use crate::store::{Observer, SlotStore};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

pub fn open(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    init(&conn)?;
    Ok(conn)
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS slots (
          name TEXT PRIMARY KEY,
          contents TEXT NOT NULL,
          updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        );
        "#,
    )?;
    Ok(())
}

pub struct SqliteStore {
    conn: Connection,
    observers: Vec<Observer>,
}

impl SqliteStore {
    pub fn open(db_path: &str) -> Result<Self> {
        Ok(Self::from_connection(open(db_path)?))
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            observers: Vec::new(),
        }
    }
}

impl SlotStore for SqliteStore {
    fn load(&self, slot: &str) -> Result<Option<String>> {
        let contents = self
            .conn
            .query_row(
                "SELECT contents FROM slots WHERE name = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        Ok(contents)
    }

    fn save(&mut self, slot: &str, contents: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO slots (name, contents)
            VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET
              contents=excluded.contents,
              updated_at=strftime('%Y-%m-%dT%H:%M:%fZ','now')
            "#,
            params![slot, contents],
        )?;
        Ok(())
    }

    fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    fn notify(&self, slot: &str) {
        for observer in &self.observers {
            observer(slot);
        }
    }
}
