pub mod d401_pc_monthly;
pub mod d402_subdiary;
pub mod d403_closures_monthly;
pub mod d404_billing_daily;
