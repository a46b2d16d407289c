//! Stored procedure example with IN and OUT parameters
//!
//! Run with: cargo run --example procedure
//!
//! Needs MySQL; connection settings are read from a property file given as the
//! first argument, or from DB_URL / DB_DRIVER / DB_USER / DB_PASSWORD.

use sqlx::{MySql, Row};
use sqlx_named_params::{
    build_call, ConnectionConfig, Connector, Function, OutParams, Params, Procedure, SqlType,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let config = match std::env::args().nth(1) {
        Some(path) => ConnectionConfig::from_file(path)?,
        None => ConnectionConfig::from_env()?,
    };
    println!("Using {:?}", config);
    let connector = Connector::<MySql>::new(config)?;
    let mut conn = connector.connect().await?;

    println!("\nCreating procedure...");
    sqlx::raw_sql(
        "DROP PROCEDURE IF EXISTS sp_get;
         CREATE PROCEDURE sp_get(IN a INT, OUT b VARCHAR(40))
         BEGIN
             SET b = CONCAT('value-', a);
         END",
    )
    .execute(&mut conn)
    .await?;

    let mut outs = OutParams::new();
    outs.insert("b".to_owned(), SqlType::Text);
    let ins = Params::new().with("a", 7);

    // The portable call text, IN markers before OUT markers
    let call = build_call("sp_get", &ins, &outs)?;
    println!("Call template: {}", call.sql());

    let procedure = Procedure::new("sp_get", ins, outs)?;
    println!("Sent as: {}", procedure.call_sql());
    if let Some(row) = procedure.call(&mut conn).await? {
        let b: String = row.try_get("b")?;
        println!("OUT b = {}", b);
    }

    let length: Option<i64> = Function::new("char_length", ["named parameters"])?
        .fetch(&mut conn)
        .await?;
    println!("char_length = {:?}", length);

    println!("\nCleaning up...");
    sqlx::query("DROP PROCEDURE IF EXISTS sp_get")
        .execute(&mut conn)
        .await?;

    println!("\nExample completed successfully!");
    Ok(())
}
