//! Seed the database with sample users and farms.
//!
//! Each user gets a random street address near Denmark's Jutland peninsula
//! and `farms_per_user` farms. Farm size and yield are drawn uniformly from
//! 1.0 to 20.0 in steps of 0.1.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distr::{Alphanumeric, SampleString};
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use tracing::info;

use farm_report_core::{Coordinates, Email};
use farm_report_server::db::{self, FarmRepository, NewUser, UserRepository};
use farm_report_server::models::NewFarm;

use super::{CommandError, database_url};

const STREETS: &[&str] = &[
    "Søndergade",
    "Vestergade",
    "Kirkevej",
    "Møllevej",
    "Skovvej",
    "Engvej",
    "Bakkevej",
    "Markvej",
];

const TOWNS: &[&str] = &[
    "8000 Aarhus C",
    "7100 Vejle",
    "8800 Viborg",
    "7400 Herning",
    "8700 Horsens",
    "9000 Aalborg",
];

const FARM_PREFIXES: &[&str] = &[
    "Green", "Hill", "Oak", "River", "Stone", "Meadow", "Birch", "North", "South", "Willow",
];

const FARM_SUFFIXES: &[&str] = &["Acres", "Fields", "Farm", "Holdings", "Ranch", "Gaard"];

/// How much to seed.
#[derive(Debug, Clone, Copy)]
pub struct SeedOptions {
    pub users: usize,
    pub farms_per_user: usize,
    pub truncate: bool,
}

/// A user to insert, with its plaintext password and farms.
#[derive(Debug, Clone)]
struct SeedUser {
    email: String,
    password: String,
    address: String,
    coordinates: Coordinates,
    farms: Vec<SeedFarm>,
}

#[derive(Debug, Clone)]
struct SeedFarm {
    name: String,
    address: String,
    coordinates: Coordinates,
    size: Decimal,
    farm_yield: Decimal,
}

/// A decimal in `[1.0, 20.0]` with one fractional digit.
fn tenth_between_1_and_20(rng: &mut impl Rng) -> Decimal {
    Decimal::new(rng.random_range(10..=200), 1)
}

fn jutland_coordinates(rng: &mut impl Rng) -> Coordinates {
    let lat = rng.random_range(55.0..57.5);
    let lng = rng.random_range(8.2..10.6);
    Coordinates::new(lat, lng).unwrap_or(Coordinates::ORIGIN)
}

fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn street_address(rng: &mut impl Rng) -> String {
    format!(
        "{} {}, {}",
        pick(rng, STREETS),
        rng.random_range(1..=250),
        pick(rng, TOWNS)
    )
}

fn plan(options: SeedOptions, rng: &mut impl Rng) -> Vec<SeedUser> {
    (0..options.users)
        .map(|i| {
            let tag = Alphanumeric.sample_string(rng, 6).to_lowercase();
            let email = format!("grower{}.{tag}@farms.test", i + 1);

            let farms = (0..options.farms_per_user)
                .map(|n| SeedFarm {
                    name: format!(
                        "{} {} {}",
                        pick(rng, FARM_PREFIXES),
                        pick(rng, FARM_SUFFIXES),
                        n + 1
                    ),
                    address: street_address(rng),
                    coordinates: jutland_coordinates(rng),
                    size: tenth_between_1_and_20(rng),
                    farm_yield: tenth_between_1_and_20(rng),
                })
                .collect();

            SeedUser {
                email,
                password: Alphanumeric.sample_string(rng, 16),
                address: street_address(rng),
                coordinates: jutland_coordinates(rng),
                farms,
            }
        })
        .collect()
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, CommandError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CommandError::PasswordHash)
}

/// Seed users and farms.
///
/// # Errors
///
/// Returns an error if environment variables are missing or database
/// operations fail.
pub async fn run(options: SeedOptions) -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let users_repo = UserRepository::new(&pool);
    let farms_repo = FarmRepository::new(&pool);

    if options.truncate {
        users_repo.truncate_all().await?;
        info!("Truncated users and farms");
    }

    let planned = plan(options, &mut rand::rng());

    for seed in planned {
        let user = users_repo
            .create(&NewUser {
                email: Email::parse(&seed.email)
                    .map_err(|_| CommandError::InvalidEmail(seed.email.clone()))?,
                hashed_password: hash_password(&seed.password)?,
                address: seed.address,
                coordinates: Some(seed.coordinates),
            })
            .await?;

        for farm in seed.farms {
            farms_repo
                .create(&NewFarm {
                    owner_id: user.id,
                    name: farm.name,
                    address: farm.address,
                    coordinates: farm.coordinates,
                    size: farm.size,
                    farm_yield: farm.farm_yield,
                })
                .await?;
        }

        info!(user_id = %user.id, email = %user.email, farms = options.farms_per_user, "Seeded user");
    }

    let total = farms_repo.count().await?;
    info!("Seeding complete! Farms in database: {total}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn options() -> SeedOptions {
        SeedOptions {
            users: 4,
            farms_per_user: 30,
            truncate: false,
        }
    }

    #[test]
    fn test_plan_shape() {
        let users = plan(options(), &mut StdRng::seed_from_u64(7));

        assert_eq!(users.len(), 4);
        assert!(users.iter().all(|u| u.farms.len() == 30));

        let emails: HashSet<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails.len(), 4);
        assert!(users.iter().all(|u| Email::parse(&u.email).is_ok()));
    }

    #[test]
    fn test_size_and_yield_are_tenths_in_range() {
        let min = Decimal::ONE;
        let max = Decimal::from(20);
        let users = plan(options(), &mut StdRng::seed_from_u64(11));

        for farm in users.iter().flat_map(|u| &u.farms) {
            for value in [farm.size, farm.farm_yield] {
                assert!(value >= min && value <= max, "{value}");
                assert!(value.scale() <= 1, "{value}");
            }
        }
    }

    #[test]
    fn test_hash_password_is_argon2id() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }
}
