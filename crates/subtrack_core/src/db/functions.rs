//! Application-defined SQL functions.
//!
//! SQLite's built-in `lower()` and `LIKE` only fold ASCII letters; these
//! functions fold the full Unicode range.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Registers every function the repository queries rely on.
pub(super) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )
}
