//! Dataset loading module.
//!
//! Reads an employee CSV with polars, keeping every cell as raw text, and
//! converts it into typed [`EmployeeRecord`](crate::types::EmployeeRecord)s.
//! Cells that cannot be parsed are recorded as
//! [`ParseIssue`](crate::types::ParseIssue)s instead of failing the load.

mod reader;

pub use reader::EmployeeLoader;
