#![allow(clippy::unwrap_used)]

//! In-memory [`EnrollmentStore`] with the same visibility rules as the real tables: nothing is
//! readable before commit, and the (name, pin) key is claimed as soon as it is inserted, so a
//! concurrent transaction inserting the same key fails the way a unique index makes it fail.

use crate::database::DbError;
use crate::database::enrollment_store::EnrollmentStore;
use crate::database::tables::customer::{Customer, CustomerFace, NewCustomer, NewFaceCapture};
use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    customers: Vec<Customer>,
    faces: Vec<CustomerFace>,
    claimed_keys: HashSet<(String, String)>,
    next_face_id: i64,
    commits: usize,
    rollbacks: usize,
}

#[derive(Default)]
pub struct MemoryTx {
    customers: Vec<Customer>,
    faces: Vec<CustomerFace>,
    keys: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct MemoryEnrollmentStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryEnrollmentStore {
    pub fn customers(&self) -> Vec<Customer> {
        self.state.lock().unwrap().customers.clone()
    }

    pub fn faces(&self) -> Vec<CustomerFace> {
        self.state.lock().unwrap().faces.clone()
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state.lock().unwrap().rollbacks
    }

    /// Transactions that were neither committed nor rolled back still hold their keys.
    pub fn claimed_keys(&self) -> usize {
        self.state.lock().unwrap().claimed_keys.len()
    }
}

#[async_trait]
impl EnrollmentStore for MemoryEnrollmentStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, DbError> {
        Ok(MemoryTx::default())
    }

    async fn create_customer(
        &self,
        tx: &mut MemoryTx,
        customer: &NewCustomer,
    ) -> Result<Customer, DbError> {
        let key = (customer.name.clone(), customer.pin.clone());
        let mut state = self.state.lock().unwrap();
        if !state.claimed_keys.insert(key.clone()) {
            return Err(DbError::UniqueViolation("customers_name_pin_key".into()));
        }

        let now = Utc::now();
        let row = Customer {
            id: Uuid::new_v4(),
            name: customer.name.clone(),
            pin: customer.pin.clone(),
            created_at: now,
            updated_at: now,
        };
        tx.keys.push(key);
        tx.customers.push(row.clone());
        Ok(row)
    }

    async fn add_face_capture(
        &self,
        tx: &mut MemoryTx,
        face: &NewFaceCapture,
    ) -> Result<CustomerFace, DbError> {
        let mut state = self.state.lock().unwrap();
        let customer_known = tx.customers.iter().any(|c| c.id == face.customer_id)
            || state.customers.iter().any(|c| c.id == face.customer_id);
        if !customer_known {
            return Err(DbError::ForeignKeyViolation(
                "customer_faces_customer_id_fkey".into(),
            ));
        }

        state.next_face_id += 1;
        let now = Utc::now();
        let row = CustomerFace {
            id: state.next_face_id,
            customer_id: face.customer_id,
            face_embedding: Vector::from(face.embedding.clone()),
            image_path: face.image_path.clone(),
            capture_index: face.capture_index,
            created_at: now,
            updated_at: now,
        };
        tx.faces.push(row.clone());
        Ok(row)
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.customers.extend(tx.customers);
        state.faces.extend(tx.faces);
        state.commits += 1;
        Ok(())
    }

    async fn rollback(&self, tx: MemoryTx) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        for key in &tx.keys {
            state.claimed_keys.remove(key);
        }
        state.rollbacks += 1;
        Ok(())
    }
}
