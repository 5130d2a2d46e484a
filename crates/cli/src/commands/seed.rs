use sitetrack_db::{DemoSeed, SeedResult, VerificationResult};

use crate::commands::{
    connect_and_migrate, load_config, runtime, CommandResult, Failure, EXIT_SEED,
};

pub fn run() -> CommandResult {
    let result = load_config().and_then(|config| {
        runtime()?.block_on(async {
            let (pool, _) = connect_and_migrate(&config).await?;

            let outcome = async {
                let seeded = DemoSeed::load(&pool)
                    .await
                    .map_err(|error| ("seed_execution", error.to_string(), EXIT_SEED))?;
                let verification = DemoSeed::verify(&pool)
                    .await
                    .map_err(|error| ("seed_verification", error.to_string(), EXIT_SEED))?;
                ensure_verified(&verification)?;
                Ok::<SeedResult, Failure>(seeded)
            }
            .await;

            pool.close().await;
            outcome
        })
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", summary(&seeded)),
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}

fn ensure_verified(verification: &VerificationResult) -> Result<(), Failure> {
    if verification.all_present {
        return Ok(());
    }

    let missing = verification
        .checks
        .iter()
        .filter_map(|(check, present)| (!present).then_some(*check))
        .collect::<Vec<_>>();
    let message = if missing.is_empty() {
        "demo data did not verify".to_string()
    } else {
        format!("demo data missing after seeding: {}", missing.join(", "))
    };
    Err(("seed_verification", message, EXIT_SEED))
}

fn summary(seeded: &SeedResult) -> String {
    if seeded.projects_added == 0 && seeded.users_added == 0 {
        return "demo data already present".to_string();
    }
    format!(
        "demo data loaded: {} project(s), {} user(s)",
        seeded.projects_added, seeded.users_added
    )
}
