pub mod store;

pub use store::LibraryStore;

use crate::application::ServiceDependencies;
use std::sync::Arc;

/// 1つのインメモリストアを共有する依存関係を構築する
pub fn service_dependencies() -> ServiceDependencies {
    let store = Arc::new(LibraryStore::new());
    ServiceDependencies {
        book_repository: store.clone(),
        patron_repository: store.clone(),
        loan_repository: store,
    }
}
