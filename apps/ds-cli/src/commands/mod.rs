pub mod goal;
pub mod remind;
