//! Test and benchmark utilities.
//!
//! This module is only available when the `testutil` feature is enabled.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::backend::file::write_line;
use crate::core::Record;

/// RNG seed for deterministic record generation
pub const BENCH_RNG_SEED: u64 = 42;

const ADJECTIVES: &[&str] = &[
    "Red", "Blue", "Silent", "Lost", "Frozen", "Golden", "Hidden", "Broken", "Eternal", "Wild",
    "Ancient", "Burning", "Quiet", "Mysterious", "Little",
];

const NOUNS: &[&str] = &[
    "River", "Mountain", "Storm", "Tower", "Mirror", "Road", "Dream", "Stranger", "Warrior",
    "Island", "Kingdom", "Letter", "Clock", "Station", "Traveler",
];

const LINKS: &[&str] = &["of the", "to", "and the", "beyond the", "in the"];

const COUNTRIES: &[&str] = &["US", "GB", "CN", "FR", "JP", "IN", "DE", "KR", "IT", "BR"];

/// Generate `num_records` deterministic records with ids `1..=num_records`.
///
/// Titles mix one- and two-part names; roughly a fifth contain "to", some
/// carry an embedded single quote, and about one runtime in ten is missing.
pub fn generate_records(num_records: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=num_records)
        .map(|id| {
            let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Red");
            let noun = NOUNS.choose(&mut rng).copied().unwrap_or("River");
            let title = match rng.gen_range(0..4) {
                0 => format!("{adjective} {noun}"),
                1 => format!("The {noun}'s {adjective} Secret"),
                _ => {
                    let link = LINKS.choose(&mut rng).copied().unwrap_or("of the");
                    let other = NOUNS.choose(&mut rng).copied().unwrap_or("Storm");
                    format!("{adjective} {noun} {link} {other}")
                }
            };
            let country = COUNTRIES.choose(&mut rng).copied().unwrap_or("US");
            let year = rng.gen_range(1900..=2025);
            let runtime = if rng.gen_bool(0.1) {
                None
            } else {
                Some(rng.gen_range(60..=200))
            };
            Record::new(id as u32, title, country, year, runtime)
        })
        .collect()
}

/// Small hand-written record set covering the interesting title shapes.
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new(1, "Road to Nowhere", "US", 1995, Some(101)),
        Record::new(2, "Blue Sky", "GB", 2003, None),
        Record::new(7, "Mirror's War", "US", 1999, Some(120)),
        Record::new(8, "Back to the Future, to the Past", "US", 1985, Some(116)),
        Record::new(9, format!("to{}", "x".repeat(97)), "FR", 1990, Some(90)),
        Record::new(10, "The Lost Tower", "CN", 2000, Some(88)),
        Record::new(11, "'Quoted' Title", "JP", 2010, Some(95)),
    ]
}

/// Write `records` to `path` in the flat-file encoding, one per line.
pub fn write_movie_file(path: &Path, records: &[Record]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        write_line(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Write `records` into a fresh temporary directory.
/// Returns the file path and the TempDir (keep it alive to prevent cleanup).
pub fn setup_movie_file(records: &[Record]) -> (PathBuf, tempfile::TempDir) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("movies.txt");
    write_movie_file(&path, records).unwrap();
    (path, temp_dir)
}
