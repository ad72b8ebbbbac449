//! D-Bus client side of the notices daemon
//!
//! Talks to org.freedesktop.systemd1 on the system bus.
//!
//! Key pieces:
//! - Unit object path codec (unit name <-> /org/freedesktop/systemd1/unit/...)
//! - Unit: ActiveState property queries
//! - Watch: PropertiesChanged subscription feeding the daemon loop

pub mod unit;
pub mod watch;

pub use unit::SystemdUnits;
pub use watch::{BusClient, BusError, PropertyChange};

/// Well-known name of the systemd manager
pub const SYSTEMD_SERVICE: &str = "org.freedesktop.systemd1";

/// Object path namespace every unit object lives under
pub const UNIT_PATH_NAMESPACE: &str = "/org/freedesktop/systemd1/unit";

/// Characters escaped in unit object paths and their escape tokens
const ESCAPES: [(char, &str); 5] = [
    ('@', "_40"),
    ('.', "_2e"),
    ('_', "_5f"),
    ('-', "_2d"),
    ('\\', "_5c"),
];

/// Convert unit name to D-Bus object path string
/// e.g., "docker.service" -> "/org/freedesktop/systemd1/unit/docker_2eservice"
pub fn unit_object_path(unit_name: &str) -> String {
    let mut escaped = String::with_capacity(unit_name.len() * 3);
    for c in unit_name.chars() {
        match ESCAPES.iter().find(|(plain, _)| *plain == c) {
            Some((_, token)) => escaped.push_str(token),
            None => escaped.push(c),
        }
    }

    format!("{}/{}", UNIT_PATH_NAMESPACE, escaped)
}

/// Convert a unit object path back to the unit name
/// e.g., "/org/freedesktop/systemd1/unit/docker_2eservice" -> "docker.service"
///
/// Only the last path segment is decoded. Underscores that do not start a
/// known escape token are kept as-is.
pub fn unit_name_from_path(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or(path);

    let mut name = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(c) = rest.chars().next() {
        let token = ESCAPES
            .iter()
            .find(|(_, token)| rest.starts_with(token));
        match token {
            Some((plain, token)) => {
                name.push(*plain);
                rest = &rest[token.len()..];
            }
            None => {
                name.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    name
}
