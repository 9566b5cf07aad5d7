pub mod emit;
pub mod simulate;
