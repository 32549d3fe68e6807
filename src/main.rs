use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use std::env;

// Use library instead of local modules
use office_api::entities::{beneficiary, office, plan, program, record, user};
use office_api::db::count_rows;
use office_api::{open_database, setup_database, table_counts, ServerConfig};

const USAGE: &str = "usage: office-api <init | seed | stats | create-user <username> <email>>";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = ServerConfig::from_env_or_yaml()?;
    let conn = open_database(&config.database_path)?;
    setup_database(&conn)?;
    println!("🗄️  Database: {}", config.database_path.display());

    match args.get(1).map(String::as_str) {
        Some("init") => run_init(&conn),
        Some("seed") => run_seed(&conn),
        Some("stats") => run_stats(&conn),
        Some("create-user") => match (args.get(2), args.get(3)) {
            (Some(username), Some(email)) => run_create_user(&conn, username, email),
            _ => bail!(USAGE),
        },
        _ => bail!(USAGE),
    }
}

fn run_init(conn: &Connection) -> Result<()> {
    println!("✓ Schema ready (WAL mode, foreign keys on)");
    run_stats(conn)
}

/// Small hierarchy lining up with the default allow-lists
fn run_seed(conn: &Connection) -> Result<()> {
    let existing = count_rows(conn, "offices")?;
    if existing > 0 {
        bail!("database already holds {} offices, refusing to seed", existing);
    }

    let head = office::insert_office(conn, "Head Office")?;
    let regional = office::insert_office(conn, "Regional Office")?;
    office::insert_office(conn, "Field Office")?;

    let food = program::insert_program(conn, head.id, "Food Security")?;
    program::insert_program(conn, head.id, "Clean Water")?;
    program::insert_program(conn, regional.id, "Education")?;

    let q1 = plan::insert_plan(conn, food.id, "Q1 Distribution")?;
    plan::insert_plan(conn, food.id, "Q2 Distribution")?;

    let ana = beneficiary::insert_beneficiary(conn, food.id, "Ana")?;
    let ben = beneficiary::insert_beneficiary(conn, food.id, "Ben")?;
    record::insert_record(conn, q1.id, ana.id, "January visit")?;
    record::insert_record(conn, q1.id, ben.id, "January visit")?;

    println!("✓ Seeded demo hierarchy");
    run_stats(conn)
}

fn run_stats(conn: &Connection) -> Result<()> {
    println!("\n📊 Row counts");
    for (table, count) in table_counts(conn)? {
        println!("   {:<14} {}", table, count);
    }
    Ok(())
}

fn run_create_user(conn: &Connection, username: &str, email: &str) -> Result<()> {
    let created = user::insert_user(conn, username, email, Utc::now())
        .with_context(|| format!("create user {}", username))?;
    println!("✓ Created user #{} ({})", created.id, created.username);
    Ok(())
}
