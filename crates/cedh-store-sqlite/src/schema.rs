//! SQL schema for the local `registros` table.
//!
//! Executed once at connection startup. The table is created if absent;
//! there is no migration machinery.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS registros (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    fecha_registro   TEXT    NOT NULL,   -- RFC 3339 UTC; server-assigned
    \"año\"            INTEGER NOT NULL,
    mes              TEXT    NOT NULL,   -- Spanish month name, e.g. 'Marzo'
    area             TEXT    NOT NULL,
    indicador_id     TEXT    NOT NULL,
    nombre_indicador TEXT    NOT NULL,   -- catalog name at recording time
    valor            REAL    NOT NULL CHECK (valor >= 0),
    UNIQUE (\"año\", mes, area, indicador_id)
);

CREATE INDEX IF NOT EXISTS registros_area_idx ON registros(area);
";
