pub mod atmosphere;
pub mod energy_supply;
pub mod irradiance;
pub mod pv_system;
pub mod solar_position;
pub mod temperature;
pub mod units;
