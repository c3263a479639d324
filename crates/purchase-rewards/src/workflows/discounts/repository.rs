use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{Customer, CustomerId};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait CustomerRepository: Send + Sync {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError>;
    fn update(&self, customer: Customer) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    fn list(&self) -> Result<Vec<Customer>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("customer already registered")]
    Conflict,
    #[error("customer not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local customer store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryCustomerRepository {
    customers: Mutex<BTreeMap<CustomerId, Customer>>,
}

impl InMemoryCustomerRepository {
    fn guard(&self) -> Result<MutexGuard<'_, BTreeMap<CustomerId, Customer>>, RepositoryError> {
        self.customers
            .lock()
            .map_err(|_| RepositoryError::Unavailable("customer store lock poisoned".to_string()))
    }
}

impl CustomerRepository for InMemoryCustomerRepository {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&customer.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    fn update(&self, customer: Customer) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
        match guard.get_mut(&customer.id) {
            Some(existing) => {
                *existing = customer;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.guard()?.values().cloned().collect())
    }
}
