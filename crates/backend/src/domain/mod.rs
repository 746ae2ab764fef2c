pub mod a001_shift_closure;
pub mod a002_sales_invoice;
pub mod a003_receipt;
pub mod a004_vehicle_position;
pub mod a005_tank;
pub mod a006_product;
pub mod a007_station_catalog;
