use crate::commands::{connect_and_migrate, load_config, runtime, CommandResult, Failure};

pub fn run() -> CommandResult {
    let result = load_config().and_then(|config| {
        runtime()?.block_on(async {
            let (pool, applied) = connect_and_migrate(&config).await?;
            pool.close().await;
            Ok::<usize, Failure>(applied)
        })
    });

    match result {
        Ok(0) => CommandResult::success("migrate", "schema already up to date"),
        Ok(applied) => {
            CommandResult::success("migrate", format!("applied {applied} pending migration(s)"))
        }
        Err(failure) => CommandResult::from_failure("migrate", failure),
    }
}
