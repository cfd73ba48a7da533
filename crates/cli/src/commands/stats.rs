use leadbot_db::{LeadRepository, SqlLeadRepository};

use crate::commands::{
    async_runtime, load_config, open_database, CommandResult, StepFailure, EXIT_DATABASE,
};

pub fn run() -> CommandResult {
    let config = match load_config("stats") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match async_runtime("stats") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let stats = SqlLeadRepository::new(pool.clone())
            .count_by_status()
            .await
            .map_err(|error| ("db_query", error.to_string(), EXIT_DATABASE))?;
        pool.close().await;
        Ok::<_, StepFailure>(stats)
    });

    match result {
        Ok(stats) => CommandResult::success_with(
            "stats",
            format!("{} leads, {} new", stats.total_leads, stats.new_leads),
            serde_json::to_value(&stats).ok(),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("stats", error_class, message, exit_code)
        }
    }
}
