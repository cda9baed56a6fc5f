//! Backend integration tests

mod contract;
mod save_load;
