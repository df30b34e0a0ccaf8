//! Synthetic dataset bootstrap
//!
//! Builds the SQLite file the pipeline queries. Runs once before use; the
//! pipeline itself never writes to the database.

use crate::error::{InsightsError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

const GENRES: &[&str] = &[
    "Action", "Adventure", "Comedy", "Drama", "Horror", "Sci-Fi", "Romance", "Thriller", "Animation", "Fantasy",
];

const NATIONALITIES: &[&str] = &[
    "American", "British", "Canadian", "Australian", "Indian", "French", "German", "Japanese", "Korean", "Spanish",
];

const ROLES: &[&str] = &["Lead", "Supporting", "Cameo"];

const DEPARTMENTS: &[&str] = &["Sales", "Engineering", "Marketing", "Finance", "HR", "Support"];

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Aisha", "Kenji", "Lucia", "Omar", "Priya", "Lars", "Chloe", "Mateo", "Ingrid", "Wei", "Noah",
    "Amara", "Diego", "Hannah", "Ravi", "Sofia", "Tomas", "Yuki",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Garcia", "Okafor", "Tanaka", "Rossi", "Haddad", "Patel", "Larsen", "Dubois", "Fernandez", "Berg",
    "Chen", "Walker", "Mensah", "Lopez", "Schmidt", "Kumar", "Moreau", "Novak", "Sato",
];

const TITLE_ADJECTIVES: &[&str] = &[
    "Crimson", "Silent", "Golden", "Broken", "Midnight", "Hidden", "Electric", "Frozen", "Scarlet", "Last",
];

const TITLE_NOUNS: &[&str] = &[
    "Horizon", "Empire", "Echo", "River", "Signal", "Garden", "Protocol", "Harbor", "Legacy", "Storm",
];

const MOVIES_DDL: &str = r#"
CREATE TABLE MOVIES (
    ID INTEGER PRIMARY KEY AUTOINCREMENT,
    TITLE TEXT NOT NULL,
    RELEASE_YEAR INTEGER NOT NULL,
    GENRE TEXT NOT NULL,
    RUNTIME_MINUTES INTEGER NOT NULL,
    RATING REAL
);
CREATE TABLE ACTORS (
    ID INTEGER PRIMARY KEY AUTOINCREMENT,
    NAME TEXT NOT NULL,
    BIRTH_YEAR INTEGER,
    NATIONALITY TEXT
);
CREATE TABLE MOVIE_ACTORS (
    MOVIE_ID INTEGER NOT NULL,
    ACTOR_ID INTEGER NOT NULL,
    ROLE TEXT,
    PRIMARY KEY (MOVIE_ID, ACTOR_ID),
    FOREIGN KEY (MOVIE_ID) REFERENCES MOVIES(ID) ON DELETE CASCADE,
    FOREIGN KEY (ACTOR_ID) REFERENCES ACTORS(ID) ON DELETE CASCADE
);
CREATE TABLE REVENUES (
    MOVIE_ID INTEGER PRIMARY KEY,
    BUDGET REAL NOT NULL,
    BOX_OFFICE_DOMESTIC REAL NOT NULL,
    BOX_OFFICE_INTERNATIONAL REAL NOT NULL,
    OPENING_WEEKEND REAL,
    FOREIGN KEY (MOVIE_ID) REFERENCES MOVIES(ID) ON DELETE CASCADE
);
"#;

const EMPLOYEE_DDL: &str = r#"
CREATE TABLE EMPLOYEE (
    ID INTEGER PRIMARY KEY AUTOINCREMENT,
    NAME TEXT NOT NULL,
    DEPARTMENT TEXT NOT NULL,
    SALARY REAL NOT NULL
);
"#;

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub seed: u64,
    pub movies: usize,
    pub actors: usize,
    pub employees: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            movies: 60,
            actors: 200,
            employees: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub tables: Vec<String>,
    pub rows: usize,
}

/// Recreate `path` with the MOVIES / ACTORS / MOVIE_ACTORS / REVENUES schema.
pub fn seed_movies(path: impl AsRef<Path>, options: &SeedOptions) -> Result<SeedSummary> {
    let mut conn = recreate(path.as_ref())?;
    let mut rng = StdRng::seed_from_u64(options.seed);

    conn.execute_batch(MOVIES_DDL).map_err(seed_err)?;
    let tx = conn.transaction().map_err(seed_err)?;
    let mut rows = 0;

    let mut actor_ids = Vec::with_capacity(options.actors);
    for _ in 0..options.actors {
        tx.execute(
            "INSERT INTO ACTORS (NAME, BIRTH_YEAR, NATIONALITY) VALUES (?1, ?2, ?3)",
            params![
                person_name(&mut rng),
                rng.gen_range(1950..=2005_i32),
                pick(&mut rng, NATIONALITIES)
            ],
        )
        .map_err(seed_err)?;
        actor_ids.push(tx.last_insert_rowid());
        rows += 1;
    }

    for _ in 0..options.movies {
        let rating = (rng.gen_range(4.0..=9.8_f64) * 10.0).round() / 10.0;
        tx.execute(
            "INSERT INTO MOVIES (TITLE, RELEASE_YEAR, GENRE, RUNTIME_MINUTES, RATING) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                format!("{} {}", pick(&mut rng, TITLE_ADJECTIVES), pick(&mut rng, TITLE_NOUNS)),
                rng.gen_range(1980..=2025_i32),
                pick(&mut rng, GENRES),
                rng.gen_range(80..=180_i32),
                rating
            ],
        )
        .map_err(seed_err)?;
        let movie_id = tx.last_insert_rowid();
        rows += 1;

        let cast_size = rng.gen_range(2..=6usize).min(actor_ids.len());
        let cast: Vec<i64> = actor_ids.choose_multiple(&mut rng, cast_size).copied().collect();
        for actor_id in cast {
            tx.execute(
                "INSERT INTO MOVIE_ACTORS (MOVIE_ID, ACTOR_ID, ROLE) VALUES (?1, ?2, ?3)",
                params![movie_id, actor_id, pick(&mut rng, ROLES)],
            )
            .map_err(seed_err)?;
            rows += 1;
        }

        let budget = rng.gen_range(5_000_000.0..200_000_000.0_f64).round();
        let opening_weekend = (rng.gen_range(0.05..0.5) * budget).round();
        let domestic = (rng.gen_range(0.5..3.0) * budget).round();
        let international = (rng.gen_range(0.5..3.5) * budget).round();
        tx.execute(
            "INSERT INTO REVENUES (MOVIE_ID, BUDGET, BOX_OFFICE_DOMESTIC, BOX_OFFICE_INTERNATIONAL, OPENING_WEEKEND)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![movie_id, budget, domestic, international, opening_weekend],
        )
        .map_err(seed_err)?;
        rows += 1;
    }

    tx.commit().map_err(seed_err)?;
    info!("Seeded movies dataset at {} ({} rows)", path.as_ref().display(), rows);

    Ok(SeedSummary {
        tables: vec!["MOVIES".into(), "ACTORS".into(), "MOVIE_ACTORS".into(), "REVENUES".into()],
        rows,
    })
}

/// Recreate `path` with the single-table HR schema.
pub fn seed_employees(path: impl AsRef<Path>, options: &SeedOptions) -> Result<SeedSummary> {
    let mut conn = recreate(path.as_ref())?;
    let mut rng = StdRng::seed_from_u64(options.seed);

    conn.execute_batch(EMPLOYEE_DDL).map_err(seed_err)?;
    let tx = conn.transaction().map_err(seed_err)?;
    for _ in 0..options.employees {
        let salary = (rng.gen_range(35_000.0..180_000.0_f64) / 100.0).round() * 100.0;
        tx.execute(
            "INSERT INTO EMPLOYEE (NAME, DEPARTMENT, SALARY) VALUES (?1, ?2, ?3)",
            params![person_name(&mut rng), pick(&mut rng, DEPARTMENTS), salary],
        )
        .map_err(seed_err)?;
    }
    tx.commit().map_err(seed_err)?;
    info!("Seeded employee dataset at {} ({} rows)", path.as_ref().display(), options.employees);

    Ok(SeedSummary {
        tables: vec!["EMPLOYEE".into()],
        rows: options.employees,
    })
}

fn recreate(path: &Path) -> Result<Connection> {
    if path.exists() {
        std::fs::remove_file(path)?;
        info!("Removed existing database file '{}'", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path).map_err(seed_err)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(seed_err)?;
    Ok(conn)
}

fn person_name(rng: &mut StdRng) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

fn pick(rng: &mut StdRng, options: &'static [&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn seed_err(e: rusqlite::Error) -> InsightsError {
    InsightsError::Seed(format!("Failed to seed database: {}", e))
}
