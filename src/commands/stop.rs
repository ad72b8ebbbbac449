//! Stop and disable the notices daemon

use notices::install::SystemdNotices;

pub async fn stop(notices: &SystemdNotices) -> Result<(), Box<dyn std::error::Error>> {
    notices.stop().await?;
    println!("○ {} - stopped", notices.service_name());

    Ok(())
}
