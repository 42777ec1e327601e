use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),

    /// A UNIQUE / PRIMARY KEY constraint rejected the statement. The message
    /// is the backend's, e.g. `UNIQUE constraint failed: asset_records.cpu_serial`.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl SQLError {
    /// Columns named by a unique-constraint message, without the table prefix.
    ///
    /// `UNIQUE constraint failed: t.a, t.b` yields `["a", "b"]`. Any other
    /// error yields an empty list.
    pub fn constraint_columns(&self) -> Vec<&str> {
        let SQLError::Constraint(msg) = self else {
            return Vec::new();
        };
        let Some((_, cols)) = msg.split_once("constraint failed:") else {
            return Vec::new();
        };
        cols.split(',')
            .map(|c| c.trim())
            .map(|c| c.rsplit_once('.').map(|(_, col)| col).unwrap_or(c))
            .filter(|c| !c.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_columns_strip_table() {
        let err = SQLError::Constraint(
            "UNIQUE constraint failed: asset_records.cpu_serial".into(),
        );
        assert_eq!(err.constraint_columns(), vec!["cpu_serial"]);

        let err = SQLError::Constraint(
            "UNIQUE constraint failed: cpu_specifications.processor, cpu_specifications.memory, cpu_specifications.storage".into(),
        );
        assert_eq!(err.constraint_columns(), vec!["processor", "memory", "storage"]);
    }

    #[test]
    fn other_errors_have_no_columns() {
        assert!(SQLError::Execution("disk I/O error".into()).constraint_columns().is_empty());
    }
}
