//! Subscribe a unit to systemd notices

use notices::install::SystemdNotices;

pub async fn subscribe(notices: &SystemdNotices) -> Result<(), Box<dyn std::error::Error>> {
    if !nix::unistd::Uid::effective().is_root() {
        log::warn!(
            "Not running as root, writing {} will likely fail",
            notices.service_file().display()
        );
    }

    notices.subscribe().await?;
    println!("● {} - subscribed", notices.service_name());

    Ok(())
}
