mod common;

#[cfg(test)]
mod tests {
    use crate::common::{init_logs, users_db};
    use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use sqlx::{Connection, FromRow, Row, Sqlite, SqliteConnection};
    use sqlx_named_params::{
        BindOptions, ConnectionConfig, Connector, Error, Function, GeneratedKeys, InList, Insert,
        Params, PreparedQuery, PreparedQueryAs, SqlType, Update, Value,
    };

    #[derive(Debug, FromRow, PartialEq)]
    struct User {
        id: i64,
        name: String,
        age: Option<i64>,
    }

    async fn seed(conn: &mut SqliteConnection) {
        for (name, age) in [("alice", 31), ("bob", 5), ("carol", 5), ("dave", 47)] {
            Insert::new("users", Params::new().with("name", name).with("age", age))
                .unwrap()
                .execute(&mut *conn)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn named_parameters_select_matching_rows() {
        let mut conn = users_db().await;
        seed(&mut conn).await;

        let users = PreparedQueryAs::<User>::new(
            "SELECT id, name, age FROM users WHERE age = :age ORDER BY id",
            Params::new().with("age", 5),
        )
        .unwrap()
        .fetch_all(&mut conn)
        .await
        .unwrap();

        assert_eq!(
            users.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
            ["bob", "carol"]
        );
    }

    #[tokio::test]
    async fn repeated_placeholder_binds_the_same_value() {
        let mut conn = users_db().await;
        seed(&mut conn).await;

        let (count,) = PreparedQueryAs::<(i64,)>::new(
            "SELECT COUNT(*) FROM users WHERE age = :age OR id = :age",
            Params::new().with("age", 5),
        )
        .unwrap()
        .fetch_one(&mut conn)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn in_list_expansion() {
        let mut conn = users_db().await;
        seed(&mut conn).await;

        let names = PreparedQuery::new(
            "SELECT name FROM users WHERE age = :age AND id IN :ids ORDER BY id",
            Params::new()
                .with("age", 5)
                .with("ids", vec![Some(1), None, Some(3), Some(4)]),
        )
        .unwrap()
        .fetch_map(&mut conn, |row| row.try_get::<String, _>("name"))
        .await
        .unwrap();
        assert_eq!(names, ["carol"]);
    }

    #[tokio::test]
    async fn in_list_inside_parentheses() {
        let mut conn = users_db().await;
        seed(&mut conn).await;

        let query = PreparedQuery::new(
            "DELETE FROM users WHERE name IN (:names)",
            Params::new().with("names", vec!["alice", "dave"]),
        )
        .unwrap();
        assert_eq!(query.sql(), "DELETE FROM users WHERE name IN (?,?)");
        assert_eq!(query.execute(&mut conn).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn in_list_expands_a_bare_marker() {
        let mut conn = users_db().await;
        seed(&mut conn).await;

        let list = InList::new("ids", vec![Some(1), None, Some(4)]).unwrap();
        let sql = list.expand_marker("DELETE FROM users WHERE id IN (?)");
        assert_eq!(sql, "DELETE FROM users WHERE id IN (:ids0,:ids1)");

        let query = PreparedQuery::new(&sql, list.params()).unwrap();
        assert_eq!(query.order(), ["ids0", "ids1"]);
        assert_eq!(query.execute(&mut conn).await.unwrap(), 2);

        let sql = InList::new("ages", vec![5])
            .unwrap()
            .expand_marker("SELECT name FROM users WHERE age IN ? ORDER BY id");
        let names = PreparedQuery::new(sql, Params::new().with("ages0", 5))
            .unwrap()
            .fetch_map(&mut conn, |row| row.try_get::<String, _>("name"))
            .await
            .unwrap();
        assert_eq!(names, ["bob", "carol"]);
    }

    #[tokio::test]
    async fn insert_returns_generated_key() {
        let mut conn = users_db().await;

        let first = Insert::new("users", Params::new().with("name", "erin"))
            .unwrap()
            .generated_keys(GeneratedKeys::Return)
            .execute(&mut conn)
            .await
            .unwrap();
        let second = Insert::new("users", Params::new().with("name", "frank").with("age", 20))
            .unwrap()
            .generated_keys(GeneratedKeys::Return)
            .execute(&mut conn)
            .await
            .unwrap();

        assert!(first > 0);
        assert_eq!(second, first + 1);
    }

    #[tokio::test]
    async fn insert_without_generated_keys_returns_row_count() {
        let mut conn = users_db().await;
        let inserted = Insert::new("users", Params::new().with("name", "gina"))
            .unwrap()
            .execute(&mut conn)
            .await
            .unwrap();
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn missing_generated_key_is_an_error() {
        let mut conn = users_db().await;

        let err = PreparedQuery::with_generated_keys(
            "UPDATE users SET age = :age",
            Params::new().with("age", 1),
            GeneratedKeys::Return,
        )
        .unwrap()
        .execute(&mut conn)
        .await
        .unwrap_err();
        assert!(matches!(err, Error::KeyRetrieval { sql } if sql == "UPDATE users SET age = ?"));
    }

    #[tokio::test]
    async fn stale_key_is_not_reported_for_rowless_statements() {
        init_logs();
        let mut conn = users_db().await;

        let id = Insert::new("users", Params::new().with("id", 1).with("name", "alice"))
            .unwrap()
            .generated_keys(GeneratedKeys::Return)
            .execute(&mut conn)
            .await
            .unwrap();
        assert_eq!(id, 1);

        // Same connection: the previous rowid is still the driver's last key
        let err = PreparedQuery::with_generated_keys(
            "INSERT OR IGNORE INTO users (id, name) VALUES (:id, :name)",
            Params::new().with("id", 1).with("name", "again"),
            GeneratedKeys::Return,
        )
        .unwrap()
        .execute(&mut conn)
        .await
        .unwrap_err();
        assert!(matches!(err, Error::KeyRetrieval { .. }));

        let err = PreparedQuery::with_generated_keys(
            "UPDATE users SET age = :age WHERE id = :id",
            Params::new().with("age", 3).with("id", 99),
            GeneratedKeys::Return,
        )
        .unwrap()
        .execute(&mut conn)
        .await
        .unwrap_err();
        assert!(matches!(err, Error::KeyRetrieval { sql } if sql == "UPDATE users SET age = ? WHERE id = ?"));

        let (count,) = PreparedQueryAs::<(i64,)>::new("SELECT COUNT(*) FROM users", Params::new())
            .unwrap()
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn update_builder() {
        let mut conn = users_db().await;
        seed(&mut conn).await;

        let updated = Update::new(
            "users",
            Params::new().with("age", 6).with("email", Value::null()),
            Params::new().with("age", 5),
        )
        .unwrap()
        .execute(&mut conn)
        .await
        .unwrap();
        assert_eq!(updated, 2);

        let updated = Update::new(
            "users",
            Params::new().with("name", "renamed"),
            Params::new().with("id", vec![1, 4]),
        )
        .unwrap()
        .execute(&mut conn)
        .await
        .unwrap();
        assert_eq!(updated, 2);

        let users = PreparedQueryAs::<User>::new("SELECT id, name, age FROM users ORDER BY id", Params::new())
            .unwrap()
            .fetch_all(&mut conn)
            .await
            .unwrap();
        assert_eq!(
            users,
            [
                User { id: 1, name: "renamed".into(), age: Some(31) },
                User { id: 2, name: "bob".into(), age: Some(6) },
                User { id: 3, name: "carol".into(), age: Some(6) },
                User { id: 4, name: "renamed".into(), age: Some(47) },
            ]
        );
    }

    #[tokio::test]
    async fn typed_nulls_are_bound() {
        let mut conn = users_db().await;

        PreparedQuery::new(
            "INSERT INTO users (name, email, age, born) VALUES (:name, :email, :age, :born)",
            Params::new()
                .with("name", "hank")
                .with("email", Value::typed_null(SqlType::Text))
                .with("age", Value::typed_null(SqlType::Integer))
                .with("born", Value::typed_null(SqlType::Date)),
        )
        .unwrap()
        .execute(&mut conn)
        .await
        .unwrap();

        let user = PreparedQueryAs::<User>::new(
            "SELECT id, name, age FROM users WHERE name = :name AND email IS NULL AND born IS NULL",
            Params::new().with("name", "hank"),
        )
        .unwrap()
        .fetch_optional(&mut conn)
        .await
        .unwrap();
        assert_eq!(user.map(|u| u.age), Some(None));
    }

    #[tokio::test]
    async fn untyped_null_fails_before_execution() {
        init_logs();
        let err = PreparedQuery::new(
            "INSERT INTO users (name, email) VALUES (:name, :email)",
            Params::new().with("name", "ivan").with("email", None::<String>),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NullParameter(name) if name == "email"));
    }

    #[tokio::test]
    async fn dates_and_times() {
        let mut conn = users_db().await;
        let born = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
        let seen = born.and_hms_opt(10, 30, 0).unwrap();

        PreparedQuery::new(
            "INSERT INTO users (name, born, seen_at) VALUES (:name, :born, :seen_at)",
            Params::new()
                .with("name", "judy")
                .with("born", born)
                .with("seen_at", seen),
        )
        .unwrap()
        .bind_options(BindOptions::with_offset(FixedOffset::east_opt(2 * 3600).unwrap()))
        .execute(&mut conn)
        .await
        .unwrap();

        let row = PreparedQuery::new(
            "SELECT born, seen_at FROM users WHERE name = :name",
            Params::new().with("name", "judy"),
        )
        .unwrap()
        .fetch_rows(&mut conn)
        .await
        .unwrap()
        .pop()
        .unwrap();

        assert_eq!(row.get::<NaiveDate, _>("born"), born);
        // Wall clock read at +02:00 and stored as UTC
        assert_eq!(
            row.get::<NaiveDateTime, _>("seen_at"),
            born.and_hms_opt(8, 30, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn instant_marked_as_date() {
        let mut conn = users_db().await;
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap();

        Insert::new(
            "users",
            Params::new()
                .with("name", "kim")
                .with("born", Value::instant_as(instant, SqlType::Date))
                .with("seen_at", instant),
        )
        .unwrap()
        .bind_options(BindOptions::with_offset(FixedOffset::east_opt(3600).unwrap()))
        .execute(&mut conn)
        .await
        .unwrap();

        let (born, seen_at) = PreparedQueryAs::<(NaiveDate, NaiveDateTime)>::new(
            "SELECT born, seen_at FROM users WHERE name = :name",
            Params::new().with("name", "kim"),
        )
        .unwrap()
        .fetch_one(&mut conn)
        .await
        .unwrap();
        assert_eq!(born, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(seen_at, instant.naive_utc());
    }

    #[tokio::test]
    async fn scalar_functions() {
        let mut conn = users_db().await;

        let abs: Option<i64> = Function::new("abs", [-5]).unwrap().fetch(&mut conn).await.unwrap();
        assert_eq!(abs, Some(5));

        let upper: Option<String> = Function::new("upper", ["hello"])
            .unwrap()
            .fetch(&mut conn)
            .await
            .unwrap();
        assert_eq!(upper.as_deref(), Some("HELLO"));

        let nothing: Option<i64> = Function::new("nullif", [1, 1])
            .unwrap()
            .fetch(&mut conn)
            .await
            .unwrap();
        assert_eq!(nothing, None);
    }

    #[tokio::test]
    async fn execution_error_carries_sql() {
        let mut conn = users_db().await;
        let err = PreparedQuery::new(
            "DELETE FROM missing_table WHERE id = :id",
            Params::new().with("id", 1),
        )
        .unwrap()
        .execute(&mut conn)
        .await
        .unwrap_err();

        match err {
            Error::Execution { sql, .. } => assert_eq!(sql, "DELETE FROM missing_table WHERE id = ?"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn transaction_stays_open_for_caller() {
        let mut conn = users_db().await;
        seed(&mut conn).await;

        let mut tx = conn.begin().await.unwrap();
        let deleted = PreparedQuery::new(
            "DELETE FROM users WHERE age = :age",
            Params::new().with("age", 5),
        )
        .unwrap()
        .execute(&mut *tx)
        .await
        .unwrap();
        assert_eq!(deleted, 2);
        tx.rollback().await.unwrap();

        let (count,) = PreparedQueryAs::<(i64,)>::new("SELECT COUNT(*) FROM users", Params::new())
            .unwrap()
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn pool_from_configuration() {
        init_logs();
        let config = ConnectionConfig::from_connection_string("url=sqlite::memory:;driver=sqlite")
            .unwrap();
        let pool = Connector::<Sqlite>::new(config).unwrap().pool(1).await.unwrap();

        sqlx::query("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        let id = Insert::new("items", Params::new().with("label", "first"))
            .unwrap()
            .generated_keys(GeneratedKeys::Return)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(id, 1);

        let label: Option<String> = PreparedQueryAs::<(String,)>::new(
            "SELECT label FROM items WHERE id = :id",
            Params::new().with("id", 1),
        )
        .unwrap()
        .fetch_optional(&pool)
        .await
        .unwrap()
        .map(|(label,)| label);
        assert_eq!(label.as_deref(), Some("first"));
        pool.close().await;
    }
}
