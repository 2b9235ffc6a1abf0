pub mod output;
pub mod review;
