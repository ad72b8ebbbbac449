mod reload;
mod status;
mod stop;
mod subscribe;

pub use reload::reload;
pub use status::status;
pub use stop::stop;
pub use subscribe::subscribe;
