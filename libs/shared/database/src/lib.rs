pub mod supabase;

pub use supabase::{all_rows, first_row, ApiError, SupabaseClient};
