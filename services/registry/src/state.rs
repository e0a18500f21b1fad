use crate::domain::collection::Collection;
use crate::domain::types::{Course, Enrollment, Record, Student, User};
use crate::infra::backend::StoreBackend;

#[derive(Clone)]
pub struct AppState {
    pub store: StoreBackend,
}

impl AppState {
    pub fn collection<T: Record>(&self) -> Collection<StoreBackend, T> {
        Collection::new(self.store.clone())
    }

    pub fn users(&self) -> Collection<StoreBackend, User> {
        self.collection()
    }

    pub fn students(&self) -> Collection<StoreBackend, Student> {
        self.collection()
    }

    pub fn courses(&self) -> Collection<StoreBackend, Course> {
        self.collection()
    }

    pub fn enrollments(&self) -> Collection<StoreBackend, Enrollment> {
        self.collection()
    }
}
