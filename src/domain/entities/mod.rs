pub mod mapping;
pub mod report;
pub mod selection;
pub mod table;
pub mod unit;
