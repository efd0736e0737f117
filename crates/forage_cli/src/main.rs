//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `forage_core` linkage.
//! - Run one add/update/delete pass against an in-memory store.

use forage_core::db::open_db_in_memory;
use forage_core::{ForageableInput, ForageableService, RewardCounter, SqliteForageableStore};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("forage_core ping={}", forage_core::ping());
    println!("forage_core version={}", forage_core::core_version());

    match smoke_crud() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("forage_core smoke=failed error={err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke_crud() -> Result<(), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let service = ForageableService::new(SqliteForageableStore::try_new(&conn)?)?;
    let mut listing = service.retrieve_all_forageables();

    let input = ForageableInput::new("Morel patch", "123 Forest Rd")
        .with_notes("near the creek")
        .with_in_season(true)
        .with_remind_text("check weekly");
    let id = service.add_forageable(&input)?;
    service.update_forageable(id, &input.with_in_season(false))?;
    let after_update = listing.poll_update().map_or(0, |rows| rows.len());
    service.delete_by_id(id)?;
    let after_delete = listing.poll_update().map_or(0, |rows| rows.len());

    let mut reward = RewardCounter::new();
    reward.spin();

    println!(
        "forage_core smoke=ok id={id} listed_after_update={after_update} listed_after_delete={after_delete} exp={}",
        reward.current()
    );
    Ok(())
}
