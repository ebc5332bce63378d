pub mod inverter;
pub mod pv;
