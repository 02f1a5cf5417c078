pub mod collaborators;
pub mod device_history;
pub mod error;
pub mod history_store;
pub mod product;
pub mod reading;
pub mod shelf_life;
pub mod statistics;

pub use collaborators::*;
pub use device_history::DeviceHistory;
pub use error::{DomainError, DomainResult};
pub use history_store::HistoryStore;
pub use product::Product;
pub use reading::Reading;
pub use shelf_life::ShelfLifeEstimator;
pub use statistics::{FieldStatistics, Report, StatisticsReporter};
