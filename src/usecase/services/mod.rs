pub mod column_resolver;
pub mod grouper;
pub mod import_service;
pub mod note_compiler;
pub mod overrides;
pub mod report_service;
pub mod row_filter;
pub mod views;
