//! Records exchanged with the employee REST backend.

pub mod employee;

pub use employee::{ContactPreference, Employee, EmployeeId, ParsePreferenceError, Skill};
