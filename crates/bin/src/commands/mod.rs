pub mod account;
pub mod pref;
