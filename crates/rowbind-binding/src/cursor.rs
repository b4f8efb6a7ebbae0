//! Lazy row streams.

use rowbind_reflect::Value;

use crate::error::BindingError;

/// A lazily-evaluated row stream returned by cursor-shaped reads. Rows are
/// produced on demand by the executor; iteration order is the operation's
/// result order.
pub struct Cursor {
    rows: Box<dyn Iterator<Item = Result<Value, BindingError>> + Send>,
}

impl Cursor {
    /// Wrap an iterator of rows.
    pub fn new(rows: Box<dyn Iterator<Item = Result<Value, BindingError>> + Send>) -> Self {
        Cursor { rows }
    }

    /// Build a cursor over an already-materialized row list, mainly for
    /// executors that cannot stream.
    pub fn from_rows(rows: Vec<Value>) -> Self {
        Cursor {
            rows: Box::new(rows.into_iter().map(Ok)),
        }
    }
}

impl Iterator for Cursor {
    type Item = Result<Value, BindingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_rows_in_order() {
        let cursor = Cursor::from_rows(vec![Value::Int(1), Value::Int(2)]);
        let rows: Result<Vec<Value>, _> = cursor.collect();
        assert_eq!(rows.unwrap(), vec![Value::Int(1), Value::Int(2)]);
    }
}
