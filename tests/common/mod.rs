use log::LevelFilter;
use sqlx::{Connection, SqliteConnection};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Fresh in-memory database with a `users` table.
#[allow(dead_code)]
pub async fn users_db() -> SqliteConnection {
    init_logs();
    let mut conn = SqliteConnection::connect("sqlite::memory:")
        .await
        .expect("Could not open in-memory database");
    sqlx::query(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            age INTEGER,
            active BOOLEAN NOT NULL DEFAULT 1,
            born DATE,
            seen_at DATETIME
        )",
    )
    .execute(&mut conn)
    .await
    .expect("Could not create users table");
    conn
}
