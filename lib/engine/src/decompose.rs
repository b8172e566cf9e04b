use crate::error::MediatorError;
use spargebra::algebra::{AggregateExpression, Expression, GraphPattern};
use spargebra::term::{
    GraphNamePattern, GroundTerm, NamedNodePattern, QuadPattern, TermPattern, TriplePattern,
};
use spargebra::{GraphUpdateOperation, Query, Update};
use sparql_mediator_model::{
    BindingRow, PatternGroup, PatternTerm, RequestDecomposition, Term, TriplePattern as Triple,
    ValuesClause, Variable,
};

/// Splits a SELECT query into the patterns that must be fetched from the knowledge network.
///
/// The outermost projection is unwrapped. Solution modifiers around it (DISTINCT, REDUCED,
/// LIMIT/OFFSET) and an explicit dataset are rejected.
pub fn decompose_query(query: &Query) -> Result<RequestDecomposition, MediatorError> {
    let pattern = match query {
        Query::Select {
            dataset, pattern, ..
        } => {
            if dataset.is_some() {
                return Err(MediatorError::unsupported_construct("FROM"));
            }
            pattern
        }
        Query::Construct { .. } => return Err(MediatorError::unsupported_request_type("CONSTRUCT")),
        Query::Describe { .. } => return Err(MediatorError::unsupported_request_type("DESCRIBE")),
        Query::Ask { .. } => return Err(MediatorError::unsupported_request_type("ASK")),
    };

    let inner = match pattern {
        GraphPattern::Project { inner, .. } => inner.as_ref(),
        other => other,
    };

    let mut decomposer = Decomposer::default();
    decomposer.decompose(inner)?;
    Ok(decomposer.finish())
}

/// Splits an `INSERT { .. } WHERE { .. }` update into its insert template and the patterns of
/// its WHERE clause.
pub fn decompose_update(update: &Update) -> Result<RequestDecomposition, MediatorError> {
    let [operation] = update.operations.as_slice() else {
        return Err(MediatorError::unsupported_request_type(format!(
            "{} update operations, only a single INSERT WHERE is supported",
            update.operations.len()
        )));
    };

    match operation {
        GraphUpdateOperation::DeleteInsert {
            delete,
            insert,
            using,
            pattern,
        } => {
            if !delete.is_empty() {
                return Err(MediatorError::unsupported_request_type("DELETE"));
            }
            if using.is_some() {
                return Err(MediatorError::unsupported_construct("USING"));
            }

            let mut decomposer = Decomposer::default();
            decomposer.decompose_insert_template(insert)?;
            decomposer.decompose(pattern)?;
            Ok(decomposer.finish())
        }
        GraphUpdateOperation::InsertData { .. } => {
            Err(MediatorError::unsupported_request_type("INSERT DATA"))
        }
        GraphUpdateOperation::DeleteData { .. } => {
            Err(MediatorError::unsupported_request_type("DELETE DATA"))
        }
        GraphUpdateOperation::Load { .. } => Err(MediatorError::unsupported_request_type("LOAD")),
        GraphUpdateOperation::Clear { .. } => Err(MediatorError::unsupported_request_type("CLEAR")),
        GraphUpdateOperation::Create { .. } => {
            Err(MediatorError::unsupported_request_type("CREATE"))
        }
        GraphUpdateOperation::Drop { .. } => Err(MediatorError::unsupported_request_type("DROP")),
    }
}

#[derive(Default)]
struct Decomposer {
    decomposition: RequestDecomposition,
}

impl Decomposer {
    fn finish(self) -> RequestDecomposition {
        self.decomposition
    }

    fn decompose(&mut self, pattern: &GraphPattern) -> Result<(), MediatorError> {
        match pattern {
            GraphPattern::Bgp { patterns } => {
                for triple in patterns {
                    let triple = convert_triple(triple)?;
                    self.decomposition.main_pattern.push(triple);
                }
                Ok(())
            }
            GraphPattern::Join { left, right } => {
                self.decompose(left)?;
                self.decompose(right)
            }
            GraphPattern::LeftJoin {
                left,
                right,
                expression,
            } => {
                self.decompose(left)?;
                if let Some(expression) = expression {
                    check_exists(expression, "FILTER ")?;
                }
                let GraphPattern::Bgp { patterns } = right.as_ref() else {
                    return Err(MediatorError::unsupported_construct(
                        "OPTIONAL with a non-basic graph pattern",
                    ));
                };
                let optional = patterns
                    .iter()
                    .map(convert_triple)
                    .collect::<Result<PatternGroup, _>>()?;
                self.decomposition.optional_patterns.push(optional);
                Ok(())
            }
            GraphPattern::Filter { expr, inner } => {
                check_exists(expr, "FILTER ")?;
                self.decompose(inner)
            }
            GraphPattern::Extend {
                inner, expression, ..
            } => {
                check_exists(expression, "")?;
                self.decompose(inner)
            }
            GraphPattern::Group {
                inner, aggregates, ..
            } => {
                for (_, aggregate) in aggregates {
                    if let AggregateExpression::FunctionCall { expr, .. } = aggregate {
                        check_exists(expr, "")?;
                    }
                }
                self.decompose(inner)
            }
            GraphPattern::Values {
                variables,
                bindings,
            } => {
                let clause = convert_values(variables, bindings)?;
                self.decomposition.values_clauses.push(clause);
                Ok(())
            }
            GraphPattern::Path { .. } => Err(MediatorError::unsupported_construct("property path")),
            GraphPattern::Union { .. } => Err(MediatorError::unsupported_construct("UNION")),
            GraphPattern::Minus { .. } => Err(MediatorError::unsupported_construct("MINUS")),
            GraphPattern::Graph { .. } => Err(MediatorError::unsupported_construct("GRAPH")),
            GraphPattern::Service { .. } => Err(MediatorError::unsupported_construct("SERVICE")),
            GraphPattern::Lateral { .. } => Err(MediatorError::unsupported_construct("LATERAL")),
            GraphPattern::Project { .. } => Err(MediatorError::unsupported_construct("sub-select")),
            GraphPattern::Distinct { .. } => Err(MediatorError::unsupported_construct("DISTINCT")),
            GraphPattern::Reduced { .. } => Err(MediatorError::unsupported_construct("REDUCED")),
            GraphPattern::OrderBy { .. } => Err(MediatorError::unsupported_construct("ORDER BY")),
            GraphPattern::Slice { .. } => {
                Err(MediatorError::unsupported_construct("LIMIT/OFFSET"))
            }
        }
    }

    fn decompose_insert_template(&mut self, template: &[QuadPattern]) -> Result<(), MediatorError> {
        for quad in template {
            if !matches!(quad.graph_name, GraphNamePattern::DefaultGraph) {
                return Err(MediatorError::unsupported_construct("GRAPH in INSERT template"));
            }
            let subject = convert_template_term(&quad.subject)?;
            let predicate = convert_predicate(&quad.predicate);
            let object = convert_template_term(&quad.object)?;
            self.decomposition
                .insert_pattern
                .push(Triple::new(subject, predicate, object));
        }
        Ok(())
    }
}

/// Expressions are evaluated locally, except for EXISTS tests as these would require fetching
/// the patterns nested in the expression.
///
/// `context` prefixes the name of the rejected construct, e.g. `FILTER `.
fn check_exists(expression: &Expression, context: &str) -> Result<(), MediatorError> {
    match find_exists(expression, false) {
        Some(construct) => Err(MediatorError::unsupported_construct(format!(
            "{context}{construct}"
        ))),
        None => Ok(()),
    }
}

fn find_exists(expression: &Expression, negated: bool) -> Option<&'static str> {
    match expression {
        Expression::Exists(_) => Some(if negated { "NOT EXISTS" } else { "EXISTS" }),
        Expression::Not(inner) => find_exists(inner, !negated),
        Expression::UnaryPlus(inner) | Expression::UnaryMinus(inner) => find_exists(inner, false),
        Expression::Or(lhs, rhs)
        | Expression::And(lhs, rhs)
        | Expression::Equal(lhs, rhs)
        | Expression::SameTerm(lhs, rhs)
        | Expression::Greater(lhs, rhs)
        | Expression::GreaterOrEqual(lhs, rhs)
        | Expression::Less(lhs, rhs)
        | Expression::LessOrEqual(lhs, rhs)
        | Expression::Add(lhs, rhs)
        | Expression::Subtract(lhs, rhs)
        | Expression::Multiply(lhs, rhs)
        | Expression::Divide(lhs, rhs) => {
            find_exists(lhs, false).or_else(|| find_exists(rhs, false))
        }
        Expression::In(lhs, rhs) => find_exists(lhs, false)
            .or_else(|| rhs.iter().find_map(|e| find_exists(e, false))),
        Expression::If(test, if_true, if_false) => find_exists(test, false)
            .or_else(|| find_exists(if_true, false))
            .or_else(|| find_exists(if_false, false)),
        Expression::Coalesce(args) | Expression::FunctionCall(_, args) => {
            args.iter().find_map(|e| find_exists(e, false))
        }
        Expression::NamedNode(_)
        | Expression::Literal(_)
        | Expression::Variable(_)
        | Expression::Bound(_) => None,
    }
}

fn convert_triple(triple: &TriplePattern) -> Result<Triple, MediatorError> {
    Ok(Triple::new(
        convert_term(&triple.subject)?,
        convert_predicate(&triple.predicate),
        convert_term(&triple.object)?,
    ))
}

fn convert_predicate(predicate: &NamedNodePattern) -> PatternTerm {
    match predicate {
        NamedNodePattern::NamedNode(node) => node.clone().into(),
        NamedNodePattern::Variable(variable) => variable.clone().into(),
    }
}

/// Blank nodes of a query pattern are non-distinguished variables.
fn convert_term(term: &TermPattern) -> Result<PatternTerm, MediatorError> {
    match term {
        TermPattern::NamedNode(node) => Ok(node.clone().into()),
        TermPattern::Literal(literal) => Ok(literal.clone().into()),
        TermPattern::Variable(variable) => Ok(variable.clone().into()),
        TermPattern::BlankNode(node) => Ok(blank_node_variable(node.as_str()).into()),
        TermPattern::Triple(_) => Err(MediatorError::unsupported_construct("quoted triple")),
    }
}

fn convert_template_term(term: &TermPattern) -> Result<PatternTerm, MediatorError> {
    match term {
        TermPattern::BlankNode(_) => Err(MediatorError::unsupported_construct(
            "blank node in INSERT template",
        )),
        other => convert_term(other),
    }
}

fn blank_node_variable(label: &str) -> Variable {
    let name = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();
    Variable::new_unchecked(format!("bnode_{name}"))
}

/// UNDEF entries are left out of the row.
fn convert_values(
    variables: &[Variable],
    bindings: &[Vec<Option<GroundTerm>>],
) -> Result<ValuesClause, MediatorError> {
    bindings
        .iter()
        .map(|values| {
            let mut row = BindingRow::new();
            for (variable, value) in variables.iter().zip(values) {
                let value = match value {
                    None => continue,
                    Some(GroundTerm::NamedNode(node)) => Term::from(node.clone()),
                    Some(GroundTerm::Literal(literal)) => Term::from(literal.clone()),
                    Some(GroundTerm::Triple(_)) => {
                        return Err(MediatorError::unsupported_construct("quoted triple"))
                    }
                };
                row.insert(variable.as_str(), value);
            }
            Ok(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_mediator_model::{Literal, NamedNode};

    fn query(text: &str) -> Result<RequestDecomposition, MediatorError> {
        decompose_query(&Query::parse(text, None).unwrap())
    }

    fn update(text: &str) -> Result<RequestDecomposition, MediatorError> {
        decompose_update(&Update::parse(text, None).unwrap())
    }

    fn assert_unsupported_construct(result: Result<RequestDecomposition, MediatorError>, name: &str) {
        match result {
            Err(MediatorError::UnsupportedConstruct(construct)) => assert_eq!(construct, name),
            other => panic!("Expected unsupported construct {name}, got {other:?}"),
        }
    }

    #[test]
    fn basic_graph_pattern_becomes_main_pattern() {
        let decomposition = query(
            "PREFIX ex: <http://example.org/>
            SELECT ?e ?d WHERE { ?e a ex:Event . ?e ex:occurredAt ?d . }",
        )
        .unwrap();

        assert_eq!(
            decomposition.main_pattern.to_string(),
            "?e <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Event> . ?e <http://example.org/occurredAt> ?d ."
        );
        assert!(decomposition.optional_patterns.is_empty());
        assert!(decomposition.values_clauses.is_empty());
        assert!(decomposition.insert_pattern.is_empty());
    }

    #[test]
    fn optional_block_becomes_optional_pattern() {
        let decomposition = query(
            "PREFIX ex: <http://example.org/>
            SELECT * WHERE { ?e a ex:Event . OPTIONAL { ?e ex:label ?l } }",
        )
        .unwrap();

        assert_eq!(decomposition.main_pattern.len(), 1);
        assert_eq!(decomposition.optional_patterns.len(), 1);
        assert_eq!(
            decomposition.optional_patterns[0].to_string(),
            "?e <http://example.org/label> ?l ."
        );
    }

    #[test]
    fn values_block_becomes_clause_without_undef() {
        let decomposition = query(
            "PREFIX ex: <http://example.org/>
            SELECT * WHERE { ?e ex:occurredAt ?d . VALUES (?e ?d) { (ex:A UNDEF) (ex:B \"2002\") } }",
        )
        .unwrap();

        assert_eq!(decomposition.values_clauses.len(), 1);
        let clause = &decomposition.values_clauses[0];
        assert_eq!(clause.len(), 2);
        assert_eq!(clause[0].len(), 1);
        assert_eq!(
            clause[0].get("e"),
            Some(&NamedNode::new_unchecked("http://example.org/A").into())
        );
        assert_eq!(clause[1].get("d"), Some(&Literal::from("2002").into()));
    }

    #[test]
    fn filters_binds_and_aggregates_are_deferred() {
        let decomposition = query(
            "PREFIX ex: <http://example.org/>
            SELECT (COUNT(?e) AS ?c) WHERE {
                ?e ex:occurredAt ?d .
                BIND(STR(?d) AS ?s)
                FILTER(?d > 2000)
            } GROUP BY ?s",
        )
        .unwrap();

        assert_eq!(
            decomposition.main_pattern.to_string(),
            "?e <http://example.org/occurredAt> ?d ."
        );
    }

    #[test]
    fn blank_nodes_become_variables() {
        let decomposition =
            query("SELECT * WHERE { _:x <http://example.org/p> ?o }").unwrap();

        let variables = decomposition.main_pattern.variables();
        assert!(variables[0].as_str().starts_with("bnode_"));
        assert_eq!(variables[1].as_str(), "o");
    }

    #[test]
    fn union_is_unsupported() {
        assert_unsupported_construct(
            query("SELECT * WHERE { { ?s ?p ?o } UNION { ?o ?p ?s } }"),
            "UNION",
        );
    }

    #[test]
    fn filter_exists_is_unsupported() {
        assert_unsupported_construct(
            query("SELECT * WHERE { ?s ?p ?o FILTER EXISTS { ?o ?p ?s } }"),
            "FILTER EXISTS",
        );
        assert_unsupported_construct(
            query("SELECT * WHERE { ?s ?p ?o FILTER NOT EXISTS { ?o ?p ?s } }"),
            "FILTER NOT EXISTS",
        );
    }

    #[test]
    fn exists_outside_filter_is_unsupported() {
        assert_unsupported_construct(
            query(
                "SELECT * WHERE { ?s <http://example.org/p> ?o BIND(EXISTS { ?s <http://example.org/q> ?x } AS ?b) }",
            ),
            "EXISTS",
        );
        assert_unsupported_construct(
            query(
                "SELECT ?s (NOT EXISTS { ?s <http://example.org/q> ?x } AS ?b) WHERE { ?s <http://example.org/p> ?o }",
            ),
            "NOT EXISTS",
        );
        assert_unsupported_construct(
            query(
                "SELECT (SUM(IF(EXISTS { ?s <http://example.org/q> ?x }, 1, 0)) AS ?n) WHERE { ?s <http://example.org/p> ?o }",
            ),
            "EXISTS",
        );
    }

    #[test]
    fn order_by_is_unsupported() {
        assert_unsupported_construct(
            query("SELECT * WHERE { ?s <http://example.org/p> ?o } ORDER BY ?o"),
            "ORDER BY",
        );
    }

    #[test]
    fn solution_modifiers_are_unsupported() {
        assert_unsupported_construct(
            query("SELECT DISTINCT ?s WHERE { ?s ?p ?o }"),
            "DISTINCT",
        );
        assert_unsupported_construct(
            query("SELECT ?s WHERE { ?s ?p ?o } LIMIT 10"),
            "LIMIT/OFFSET",
        );
    }

    #[test]
    fn sub_select_is_unsupported() {
        assert_unsupported_construct(
            query("SELECT * WHERE { ?s ?p ?o { SELECT ?s WHERE { ?s ?p ?o } } }"),
            "sub-select",
        );
    }

    #[test]
    fn non_basic_optional_is_unsupported() {
        assert!(matches!(
            query("SELECT * WHERE { ?s ?p ?o OPTIONAL { ?o ?p ?s OPTIONAL { ?s ?q ?x } } }"),
            Err(MediatorError::UnsupportedConstruct(_))
        ));
    }

    #[test]
    fn dataset_is_unsupported() {
        assert_unsupported_construct(
            query("SELECT * FROM <http://example.org/g> WHERE { ?s ?p ?o }"),
            "FROM",
        );
    }

    #[test]
    fn other_query_forms_are_unsupported() {
        assert!(matches!(
            query("ASK { ?s ?p ?o }"),
            Err(MediatorError::UnsupportedRequestType(_))
        ));
        assert!(matches!(
            query("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }"),
            Err(MediatorError::UnsupportedRequestType(_))
        ));
    }

    #[test]
    fn insert_where_is_decomposed() {
        let decomposition = update(
            "PREFIX ex: <http://example.org/>
            INSERT { ?e ex:observed ?d } WHERE {
                ?e ex:occurredAt ?d .
                OPTIONAL { ?e ex:label ?l }
                VALUES ?d { \"X\" }
            }",
        )
        .unwrap();

        assert_eq!(
            decomposition.insert_pattern.to_string(),
            "?e <http://example.org/observed> ?d ."
        );
        assert_eq!(
            decomposition.main_pattern.to_string(),
            "?e <http://example.org/occurredAt> ?d ."
        );
        assert_eq!(decomposition.optional_patterns.len(), 1);
        assert_eq!(decomposition.values_clauses.len(), 1);
    }

    #[test]
    fn other_update_forms_are_unsupported() {
        for text in [
            "INSERT DATA { <http://example.org/a> <http://example.org/b> <http://example.org/c> }",
            "DELETE WHERE { ?s ?p ?o }",
            "DELETE { ?s ?p ?o } INSERT { ?o ?p ?s } WHERE { ?s ?p ?o }",
            "CLEAR DEFAULT",
            "INSERT { ?s ?p ?o } WHERE { ?s ?p ?o } ; INSERT { ?o ?p ?s } WHERE { ?s ?p ?o }",
        ] {
            assert!(
                matches!(update(text), Err(MediatorError::UnsupportedRequestType(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn blank_nodes_in_insert_template_are_unsupported() {
        assert_unsupported_construct(
            update("INSERT { _:b <http://example.org/p> ?o } WHERE { ?s <http://example.org/p> ?o }"),
            "blank node in INSERT template",
        );
    }
}
