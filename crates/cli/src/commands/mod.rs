pub mod check;
pub mod mint;
