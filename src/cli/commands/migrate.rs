//! Migrate command handler

use crate::cli::MigrateCommands;
use crate::config::Config;
use crate::db::Store;

pub async fn cmd_migrate(config: &Config, command: MigrateCommands) -> anyhow::Result<()> {
    config.validate()?;

    // Connect without the auto-migrate step so `down` and `status` see the real state.
    let store = Store::connect(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    match command {
        MigrateCommands::Up => {
            store.migrate_up().await?;
            println!("Migrations applied");
        }
        MigrateCommands::Down { steps } => {
            store.migrate_down(steps).await?;
            match steps {
                Some(n) => println!("Rolled back {n} migration(s)"),
                None => println!("Rolled back all migrations"),
            }
        }
        MigrateCommands::Status => {
            let states = store.migration_states().await?;
            println!("{:<40} STATUS", "MIGRATION");
            println!("{:-<50}", "");
            for state in states {
                let status = if state.applied { "applied" } else { "pending" };
                println!("{:<40} {}", state.name, status);
            }
        }
        MigrateCommands::Fresh => {
            store.migrate_fresh().await?;
            println!("Schema rebuilt from scratch");
        }
    }

    Ok(())
}
