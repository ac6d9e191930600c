use crate::commands::{
    build_runtime, load_config, open_pool, CommandResult, Failure, EXIT_STORE_SETUP,
};
use immo_db::{migrations, DemoListings, VerificationResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;

        let outcome = async {
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), EXIT_STORE_SETUP))?;

            let seeded = DemoListings::load(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), EXIT_STORE_SETUP))?;

            let verification = DemoListings::verify(&pool)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), EXIT_STORE_SETUP))?;

            if verification.all_present {
                Ok::<usize, Failure>(seeded.listings_seeded)
            } else {
                let message = verification_failure_message(&verification);
                Err(("seed_verification", message, EXIT_STORE_SETUP))
            }
        }
        .await;

        pool.close().await;
        outcome
    });

    match result {
        Ok(count) => {
            CommandResult::success("seed", format!("demo catalogue loaded: {count} listings"))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_failure_message(verification: &VerificationResult) -> String {
    let missing = verification
        .checks
        .iter()
        .filter_map(|(id, present)| (!present).then(|| id.to_string()))
        .collect::<Vec<_>>();

    if missing.is_empty() {
        "Some demo listings failed to load".to_string()
    } else {
        format!("Demo listings missing or altered after load: {}", missing.join(", "))
    }
}
