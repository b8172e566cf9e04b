use crate::error::LocalEvaluationError;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use sparql_mediator_model::{BindingRow, Graph, GraphNameRef, Variable};

/// The solutions of a SELECT query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solutions {
    /// The projected variables in order of the projection.
    pub variables: Vec<Variable>,
    pub rows: Vec<BindingRow>,
}

/// Evaluates a SPARQL query over a materialized graph.
pub trait QueryEvaluator: Send + Sync {
    fn evaluate(&self, graph: &Graph, query: &str) -> Result<Solutions, LocalEvaluationError>;
}

/// Evaluates queries with an in-memory [Store] that is created for every evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxigraphEvaluator;

impl QueryEvaluator for OxigraphEvaluator {
    fn evaluate(&self, graph: &Graph, query: &str) -> Result<Solutions, LocalEvaluationError> {
        let store = Store::new()?;
        for triple in graph {
            store.insert(triple.in_graph(GraphNameRef::DefaultGraph))?;
        }

        let QueryResults::Solutions(solutions) = store.query(query)? else {
            return Err(LocalEvaluationError::NotSolutions);
        };
        let variables = solutions.variables().to_vec();
        let mut rows = Vec::new();
        for solution in solutions {
            let row = solution?
                .iter()
                .map(|(variable, value)| (variable.as_str().to_owned(), value.clone()))
                .collect::<BindingRow>();
            rows.push(row);
        }
        Ok(Solutions { variables, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_mediator_model::{Literal, NamedNode, Term, Triple};

    fn graph() -> Graph {
        let mut graph = Graph::new();
        for (event, year) in [("A", "2002"), ("B", "2010")] {
            graph.insert(&Triple::new(
                NamedNode::new_unchecked(format!("http://example.org/{event}")),
                NamedNode::new_unchecked("http://example.org/occurredAt"),
                Literal::from(year),
            ));
        }
        graph
    }

    #[test]
    fn evaluate_select_over_graph() {
        let solutions = OxigraphEvaluator
            .evaluate(
                &graph(),
                "SELECT ?e WHERE { ?e <http://example.org/occurredAt> \"2002\" }",
            )
            .unwrap();

        assert_eq!(solutions.variables, vec![Variable::new_unchecked("e")]);
        assert_eq!(solutions.rows.len(), 1);
        assert_eq!(
            solutions.rows[0].get("e"),
            Some(&Term::from(NamedNode::new_unchecked("http://example.org/A")))
        );
    }

    #[test]
    fn evaluate_aggregate() {
        let solutions = OxigraphEvaluator
            .evaluate(
                &graph(),
                "SELECT (COUNT(?e) AS ?c) WHERE { ?e <http://example.org/occurredAt> ?d }",
            )
            .unwrap();

        assert_eq!(
            solutions.rows[0].get("c"),
            Some(&Term::from(Literal::from(2)))
        );
    }

    #[test]
    fn unbound_values_are_left_out() {
        let solutions = OxigraphEvaluator
            .evaluate(
                &graph(),
                "SELECT ?e ?l WHERE { ?e <http://example.org/occurredAt> ?d OPTIONAL { ?e <http://example.org/label> ?l } }",
            )
            .unwrap();

        assert_eq!(solutions.rows.len(), 2);
        assert!(solutions.rows.iter().all(|row| row.get("l").is_none()));
    }

    #[test]
    fn ask_queries_are_rejected() {
        let result = OxigraphEvaluator.evaluate(&graph(), "ASK { ?s ?p ?o }");
        assert!(matches!(result, Err(LocalEvaluationError::NotSolutions)));
    }
}
