pub mod iso_timestamp_serde;
pub mod to_fixed;
