pub mod price_provider;
pub mod sample;
pub mod yahoo;
