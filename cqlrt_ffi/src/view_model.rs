use crate::err::Result;
use crate::rset::ResultSet;


/**
Base for generated per query row accessors.

- The implementing type owns its `ResultSet` (and so releases it); the provided methods only borrow it.
- `HAS_IDENTITY_COLUMNS` is the per row type declaration of whether the query schema names
  identity columns. Without them two rows are never "the same", whatever their content.
**/
pub trait ViewModel<'db> {
    const HAS_IDENTITY_COLUMNS: bool;

    fn result_set(&self) -> &ResultSet<'db>;

    fn get_count(&self) -> Result<i32> {
        self.result_set().get_count()
    }

    fn row_hash_code(&self, row: i32) -> Result<i64> {
        self.result_set().row_hash_code(row)
    }

    fn rows_equal<'o, V>(&self, row1: i32, other: &V, row2: i32) -> Result<bool>
        where V: ViewModel<'o>
    {
        self.result_set().rows_equal(row1, other.result_set(), row2)
    }

    // The engine is not consulted when there are no identity columns.
    fn rows_same<'o, V>(&self, row1: i32, other: &V, row2: i32) -> Result<bool>
        where V: ViewModel<'o>
    {
        if !Self::HAS_IDENTITY_COLUMNS {
            return Ok(false);
        }
        self.result_set().rows_same(row1, other.result_set(), row2)
    }
}
