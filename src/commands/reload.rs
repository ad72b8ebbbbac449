//! Make the running daemon re-scan its hooks

use notices::install::SystemdNotices;

pub async fn reload(notices: &SystemdNotices) -> Result<(), Box<dyn std::error::Error>> {
    notices.reload().await?;
    println!("● {} - reloaded", notices.service_name());

    Ok(())
}
