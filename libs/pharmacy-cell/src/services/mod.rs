pub mod search;

pub use search::MedicineSearchService;
