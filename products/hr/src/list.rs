use entity::{Employee, EmployeeId};
use platform_gateway::{GatewayResult, Payload, RecordGateway};
use tracing::{error, info, warn};

use crate::routes::{Navigator, Route};

/// Employee list screen. The backend is the only source of truth; the list
/// is re-fetched after every mutation.
pub struct EmployeeList<G, N> {
    gateway: G,
    navigator: N,
    employees: Vec<Employee>,
}

impl<G, N> EmployeeList<G, N>
where
    G: RecordGateway<Employee>,
    N: Navigator,
{
    pub fn new(gateway: G, navigator: N) -> Self {
        Self {
            gateway,
            navigator,
            employees: Vec::new(),
        }
    }

    /// Last fetched rows.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub async fn refresh(&mut self) -> GatewayResult<&[Employee]> {
        match self.gateway.list().await {
            Ok(employees) => {
                info!(count = employees.len(), "employee list loaded");
                self.employees = employees;
                Ok(&self.employees)
            }
            Err(err) => {
                error!(code = err.code(), error = %err, "failed to load employees");
                Err(err)
            }
        }
    }

    /// Deletes `id`, then re-fetches the list whatever the delete outcome.
    pub async fn delete(&mut self, id: EmployeeId) -> GatewayResult<Payload> {
        let outcome = self.gateway.delete(id).await;
        match &outcome {
            Ok(_) => info!(id, "employee deleted"),
            Err(err) => error!(id, code = err.code(), error = %err, "failed to delete employee"),
        }
        if let Err(err) = self.refresh().await {
            warn!(id, error = %err, "list refresh after delete failed");
        }
        outcome
    }

    pub fn create(&self) {
        self.navigator.navigate(Route::Create);
    }

    pub fn edit(&self, id: EmployeeId) {
        self.navigator.navigate(Route::UpdateEmployee(id));
    }

    pub fn details(&self, id: EmployeeId) {
        self.navigator.navigate(Route::EmployeeDetails(id));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{GatewayCall, InMemoryGateway, RecordingNavigator, stored_employee};

    #[tokio::test]
    async fn refresh_replaces_rows() {
        let gateway = Arc::new(InMemoryGateway::seeded(vec![
            stored_employee(1, "Ann", "Lee"),
            stored_employee(2, "Bob", "Ray"),
        ]));
        let mut list = EmployeeList::new(gateway, Arc::new(RecordingNavigator::default()));
        assert!(list.employees().is_empty());

        let rows = list.refresh().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(list.employees()[1].first_name, "Bob");
    }

    #[tokio::test]
    async fn delete_refreshes_afterwards() {
        let gateway = Arc::new(InMemoryGateway::seeded(vec![
            stored_employee(3, "Ann", "Lee"),
            stored_employee(4, "Bob", "Ray"),
        ]));
        let mut list = EmployeeList::new(gateway.clone(), Arc::new(RecordingNavigator::default()));

        list.delete(3).await.unwrap();
        assert_eq!(gateway.calls(), vec![GatewayCall::Delete(3), GatewayCall::List]);
        assert_eq!(list.employees().len(), 1);
        assert_eq!(list.employees()[0].id, Some(4));
    }

    #[tokio::test]
    async fn failed_delete_still_refreshes() {
        let gateway = Arc::new(InMemoryGateway::default());
        gateway.fail();
        let mut list = EmployeeList::new(gateway.clone(), Arc::new(RecordingNavigator::default()));

        assert!(list.delete(3).await.is_err());
        assert_eq!(gateway.calls(), vec![GatewayCall::Delete(3), GatewayCall::List]);
    }

    #[test]
    fn row_actions_navigate() {
        let navigator = Arc::new(RecordingNavigator::default());
        let list = EmployeeList::new(Arc::new(InMemoryGateway::default()), navigator.clone());
        list.edit(7);
        list.details(8);
        list.create();
        assert_eq!(
            navigator.routes(),
            vec![
                Route::UpdateEmployee(7),
                Route::EmployeeDetails(8),
                Route::Create
            ]
        );
    }
}
