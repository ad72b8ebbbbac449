//! Show the notices setup and live state of watched services

use notices::daemon::{hook_service_names, service_unit_name, UnitStateQuery};
use notices::dbus::BusClient;
use notices::install::SystemdNotices;

pub async fn status(notices: &SystemdNotices) -> Result<(), Box<dyn std::error::Error>> {
    let platform = notices.platform();
    let service_file = notices.service_file();
    let hooks_dir = notices.hooks_dir();

    println!("● {}", notices.service_name());
    println!("   Platform: {:?}", platform.kind);
    let missing = if service_file.exists() { "" } else { " (missing)" };
    println!("  Unit file: {}{}", service_file.display(), missing);
    println!("      Hooks: {}", hooks_dir.display());

    if !hooks_dir.exists() {
        println!("   Services: (hooks directory missing)");
        return Ok(());
    }

    let names = hook_service_names(&hooks_dir)?;
    if names.is_empty() {
        println!("   Services: (none)");
        return Ok(());
    }

    let units = BusClient::connect().await?.units();
    println!("   Services:");
    for name in names {
        let unit_name = service_unit_name(&name);
        let state = units.active_state(&unit_name).await;
        println!("     {:<30} {}", unit_name, state);
    }

    Ok(())
}
