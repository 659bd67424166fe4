pub mod csv_table_adapter;
pub mod file_commit;
pub mod json_projection_adapter;
