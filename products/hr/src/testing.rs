//! In-memory collaborators for exercising editors and lists without a backend.

use std::sync::Mutex;

use entity::{Employee, EmployeeId};
use platform_gateway::{GatewayError, GatewayResult, Payload, RecordGateway};
use serde_json::json;

use crate::routes::{Navigator, Route};

#[derive(Clone, Debug, PartialEq)]
pub enum GatewayCall {
    List,
    Create(Employee),
    GetById(EmployeeId),
    Update(EmployeeId, Employee),
    Delete(EmployeeId),
}

/// Gateway backed by a vector, recording every call in order.
#[derive(Default)]
pub struct InMemoryGateway {
    records: Mutex<Vec<Employee>>,
    calls: Mutex<Vec<GatewayCall>>,
    next_id: Mutex<EmployeeId>,
    failing: Mutex<bool>,
    fail_deletes: Mutex<bool>,
}

impl InMemoryGateway {
    pub fn seeded(records: Vec<Employee>) -> Self {
        let next_id = records.iter().filter_map(|e| e.id).max().unwrap_or(0);
        Self {
            records: Mutex::new(records),
            next_id: Mutex::new(next_id),
            ..Self::default()
        }
    }

    /// Every later call is logged, then answered with a 503.
    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// Deletes are logged, then answered with a 500.
    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<Employee> {
        self.records.lock().unwrap().clone()
    }

    fn log(&self, call: GatewayCall) -> GatewayResult<()> {
        self.calls.lock().unwrap().push(call);
        if *self.failing.lock().unwrap() {
            return Err(GatewayError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }
}

impl RecordGateway<Employee> for InMemoryGateway {
    async fn list(&self) -> GatewayResult<Vec<Employee>> {
        self.log(GatewayCall::List)?;
        Ok(self.records())
    }

    async fn create(&self, record: &Employee) -> GatewayResult<Payload> {
        self.log(GatewayCall::Create(record.clone()))?;
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let stored = Employee {
            id: Some(*next),
            ..record.clone()
        };
        self.records.lock().unwrap().push(stored.clone());
        Ok(serde_json::to_value(stored)?)
    }

    async fn get_by_id(&self, id: EmployeeId) -> GatewayResult<Employee> {
        self.log(GatewayCall::GetById(id))?;
        self.records()
            .into_iter()
            .find(|e| e.id == Some(id))
            .ok_or(GatewayError::NotFound { id })
    }

    async fn update(&self, id: EmployeeId, record: &Employee) -> GatewayResult<Payload> {
        self.log(GatewayCall::Update(id, record.clone()))?;
        let mut records = self.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|e| e.id == Some(id))
            .ok_or(GatewayError::NotFound { id })?;
        *slot = Employee {
            id: Some(id),
            ..record.clone()
        };
        Ok(Payload::Null)
    }

    async fn delete(&self, id: EmployeeId) -> GatewayResult<Payload> {
        self.log(GatewayCall::Delete(id))?;
        if *self.fail_deletes.lock().unwrap() {
            return Err(GatewayError::Status {
                status: 500,
                body: "delete failed".into(),
            });
        }
        self.records.lock().unwrap().retain(|e| e.id != Some(id));
        Ok(json!({ "deleted": true }))
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub fn stored_employee(id: EmployeeId, first: &str, last: &str) -> Employee {
    Employee {
        id: Some(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@gmail.com", first.to_lowercase()),
        ..Employee::default()
    }
}
