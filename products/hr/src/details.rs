use std::fmt;

use entity::{Employee, EmployeeId};
use platform_gateway::{GatewayResult, RecordGateway};
use tracing::error;

/// Read-only view of one employee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeDetails {
    employee: Employee,
}

impl EmployeeDetails {
    pub async fn load<G>(gateway: &G, id: EmployeeId) -> GatewayResult<Self>
    where
        G: RecordGateway<Employee>,
    {
        let employee = gateway.get_by_id(id).await.inspect_err(|err| {
            error!(id, code = err.code(), error = %err, "failed to load employee details");
        })?;
        Ok(Self { employee })
    }

    pub fn employee(&self) -> &Employee {
        &self.employee
    }

    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let employee = &self.employee;
        let experience = employee
            .skill
            .experience_in_years
            .map(|years| years.to_string())
            .unwrap_or_default();
        vec![
            (
                "Id",
                employee.id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            ("First Name", employee.first_name.clone()),
            ("Last Name", employee.last_name.clone()),
            ("Email", employee.email.clone()),
            ("Phone", employee.phone.clone()),
            (
                "Contact Preference",
                employee.contact_preference.to_string(),
            ),
            ("Skill", employee.skill.skill_name.clone()),
            ("Experience (years)", experience),
            ("Proficiency", employee.skill.proficiency.clone()),
        ]
    }
}

impl fmt::Display for EmployeeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (label, value)) in self.lines().iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{label:<20}{value}")?;
        }
        Ok(())
    }
}
