pub mod location;
pub mod price;
pub mod station;
