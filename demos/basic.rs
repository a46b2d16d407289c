//! Basic example demonstrating named parameters, IN-lists and the builders
//!
//! Run with: cargo run --example basic
//!
//! Make sure you have a MySQL database running and set the connection
//! variables (a `.env` file works too):
//! export DB_URL="mysql://localhost/test_db" DB_DRIVER="mysql" DB_USER="user" DB_PASSWORD="password"

use sqlx::{FromRow, MySql, Row};
use sqlx_named_params::{
    ConnectionConfig, Connector, GeneratedKeys, Insert, Params, PreparedQuery, PreparedQueryAs,
    Update,
};

#[derive(Debug, FromRow)]
struct User {
    id: i64,
    name: String,
    email: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    // Load .env file if present
    dotenvy::dotenv().ok();

    println!("Connecting to database...");
    let connector = Connector::<MySql>::new(ConnectionConfig::from_env()?)?;
    let pool = connector.pool(5).await?;

    // Create table if it doesn't exist
    println!("\nCreating users table...");
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id BIGINT PRIMARY KEY AUTO_INCREMENT,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) NOT NULL UNIQUE
        )",
    )
    .execute(&pool)
    .await?;

    // Example 1: Insert with generated keys
    println!("\n--- Example 1: Inserting users ---");
    let users_to_insert = vec![
        ("Alice", "alice@example.com"),
        ("Bob", "bob@example.com"),
        ("Charlie", "charlie@example.com"),
    ];

    let mut ids = Vec::new();
    for (name, email) in users_to_insert {
        let id = Insert::new("users", Params::new().with("name", name).with("email", email))?
            .generated_keys(GeneratedKeys::Return)
            .execute(&pool)
            .await?;
        println!("Inserted user '{}': id={}", name, id);
        ids.push(i64::try_from(id)?);
    }

    // Example 2: Query all users with PreparedQueryAs
    println!("\n--- Example 2: Fetching all users ---");
    let users: Vec<User> =
        PreparedQueryAs::new("SELECT id, name, email FROM users ORDER BY id", Params::new())?
            .fetch_all(&pool)
            .await?;
    println!("Found {} users:", users.len());
    for user in &users {
        println!("  - {} (id={}, email={})", user.name, user.id, user.email);
    }

    // Example 3: Query single user by email
    println!("\n--- Example 3: Finding user by email ---");
    let search_email = "alice@example.com";
    let found = PreparedQueryAs::<User>::new(
        "SELECT id, name, email FROM users WHERE email = :email",
        Params::new().with("email", search_email),
    )?
    .fetch_optional(&pool)
    .await?;

    match found {
        Some(user) => println!("Found user: {} ({})", user.name, user.email),
        None => println!("User with email '{}' not found", search_email),
    }

    // Example 4: Update user with the UPDATE builder
    println!("\n--- Example 4: Updating user ---");
    let updated = Update::new(
        "users",
        Params::new().with("name", "Robert"),
        Params::new().with("email", "bob@example.com"),
    )?
    .execute(&pool)
    .await?;
    println!("Updated {} row(s)", updated);

    // Example 5: IN-list with closure mapping
    println!("\n--- Example 5: Names for a set of ids ---");
    let names = PreparedQuery::new(
        "SELECT name FROM users WHERE id IN :ids ORDER BY id",
        Params::new().with("ids", ids.clone()),
    )?
    .fetch_map(&pool, |row| row.try_get::<String, _>("name"))
    .await?;
    println!("Names: {}", names.join(", "));

    // Example 6: Delete user with PreparedQuery
    println!("\n--- Example 6: Deleting user ---");
    let deleted = PreparedQuery::new(
        "DELETE FROM users WHERE email = :email",
        Params::new().with("email", "charlie@example.com"),
    )?
    .execute(&pool)
    .await?;
    println!("Deleted {} row(s)", deleted);

    // Show final state
    println!("\n--- Final state ---");
    let users: Vec<User> =
        PreparedQueryAs::new("SELECT id, name, email FROM users ORDER BY id", Params::new())?
            .fetch_all(&pool)
            .await?;
    println!("Remaining {} users:", users.len());
    for user in &users {
        println!("  - {} (id={}, email={})", user.name, user.id, user.email);
    }

    // Cleanup
    println!("\nCleaning up...");
    sqlx::query("DROP TABLE IF EXISTS users").execute(&pool).await?;

    println!("\nExample completed successfully!");
    Ok(())
}
