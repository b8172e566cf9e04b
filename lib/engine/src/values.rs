use itertools::Itertools;
use sparql_mediator_model::{BindingRow, RequestDecomposition, ValuesClause};
use tracing::debug;

/// Combines all `VALUES` clauses of a decomposition into one.
///
/// With zero or one clause the decomposition is returned unchanged. Otherwise each combination
/// of one row per clause is merged and combinations that bind a variable to two different values
/// are dropped. The surviving rows form the single resulting clause, which may be empty.
pub fn resolve_values(mut decomposition: RequestDecomposition) -> RequestDecomposition {
    if decomposition.values_clauses.len() < 2 {
        return decomposition;
    }

    let clauses = std::mem::take(&mut decomposition.values_clauses);
    let resolved = combine_clauses(&clauses);
    debug!(
        "Resolved {} VALUES clauses into {} consistent rows",
        clauses.len(),
        resolved.len()
    );
    decomposition.values_clauses = vec![resolved];
    decomposition
}

fn combine_clauses(clauses: &[ValuesClause]) -> ValuesClause {
    clauses
        .iter()
        .map(|clause| clause.iter())
        .multi_cartesian_product()
        .filter_map(|combination| {
            combination
                .into_iter()
                .try_fold(BindingRow::new(), |merged, row| merged.merge(row))
        })
        .collect()
}
