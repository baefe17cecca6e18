pub mod gas_store;
