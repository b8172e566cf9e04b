use crate::content_negotiation::ResultsFormat;
use crate::error::MediatorServerError;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sparql_mediator_engine::QueryResponse;
use sparql_mediator_model::{KnowledgeGap, Literal, Term, Triple};
use std::collections::BTreeMap;

/// A query result in the SPARQL 1.1 Query Results JSON format.
///
/// If knowledge gaps were requested, the document carries an additional `knowledge_gaps` member.
#[derive(Debug, Serialize)]
pub struct SparqlResultsDocument {
    head: Head,
    results: Results,
    #[serde(skip_serializing_if = "Option::is_none")]
    knowledge_gaps: Option<Vec<KnowledgeGap>>,
}

#[derive(Debug, Serialize)]
struct Head {
    vars: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Results {
    bindings: Vec<BTreeMap<String, JsonTerm>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum JsonTerm {
    #[serde(rename = "uri")]
    Uri { value: String },
    #[serde(rename = "bnode")]
    BlankNode { value: String },
    #[serde(rename = "literal")]
    Literal {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(rename = "xml:lang", skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    #[serde(rename = "triple")]
    Triple { value: Box<JsonTriple> },
}

#[derive(Debug, Serialize)]
struct JsonTriple {
    subject: JsonTerm,
    predicate: JsonTerm,
    object: JsonTerm,
}

impl From<&Term> for JsonTerm {
    fn from(term: &Term) -> Self {
        match term {
            Term::NamedNode(node) => JsonTerm::Uri {
                value: node.as_str().to_owned(),
            },
            Term::BlankNode(node) => JsonTerm::BlankNode {
                value: node.as_str().to_owned(),
            },
            Term::Literal(literal) => literal.into(),
            Term::Triple(triple) => JsonTerm::Triple {
                value: Box::new(JsonTriple::from(&**triple)),
            },
        }
    }
}

/// Simple literals carry neither a datatype nor a language.
impl From<&Literal> for JsonTerm {
    fn from(literal: &Literal) -> Self {
        let language = literal.language().map(str::to_owned);
        let datatype = (language.is_none() && !literal.is_plain())
            .then(|| literal.datatype().as_str().to_owned());
        JsonTerm::Literal {
            value: literal.value().to_owned(),
            datatype,
            language,
        }
    }
}

impl From<&Triple> for JsonTriple {
    fn from(triple: &Triple) -> Self {
        JsonTriple {
            subject: JsonTerm::from(&Term::from(triple.subject.clone())),
            predicate: JsonTerm::Uri {
                value: triple.predicate.as_str().to_owned(),
            },
            object: JsonTerm::from(&triple.object),
        }
    }
}

impl From<QueryResponse> for SparqlResultsDocument {
    fn from(response: QueryResponse) -> Self {
        let vars = response
            .variables
            .iter()
            .map(|v| v.as_str().to_owned())
            .collect();
        let bindings = response
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(variable, value)| (variable.clone(), value.into()))
                    .collect()
            })
            .collect();
        SparqlResultsDocument {
            head: Head { vars },
            results: Results { bindings },
            knowledge_gaps: response.knowledge_gaps,
        }
    }
}

/// A results document together with the negotiated format.
pub struct QueryResultsResponse {
    pub document: SparqlResultsDocument,
    pub format: ResultsFormat,
}

impl IntoResponse for QueryResultsResponse {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.document) {
            Ok(body) => ([(CONTENT_TYPE, self.format.media_type())], body).into_response(),
            Err(e) => MediatorServerError::Internal(e.into()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sparql_mediator_model::vocab::xsd;
    use sparql_mediator_model::{BindingRow, BlankNode, NamedNode, Variable};

    fn to_json(term: Term) -> serde_json::Value {
        serde_json::to_value(JsonTerm::from(&term)).unwrap()
    }

    #[test]
    fn encode_terms() {
        assert_eq!(
            to_json(NamedNode::new_unchecked("http://example.org/A").into()),
            json!({"type": "uri", "value": "http://example.org/A"})
        );
        assert_eq!(
            to_json(BlankNode::new_unchecked("b0").into()),
            json!({"type": "bnode", "value": "b0"})
        );
        assert_eq!(
            to_json(Literal::from("plain").into()),
            json!({"type": "literal", "value": "plain"})
        );
        assert_eq!(
            to_json(Literal::new_typed_literal("2002", xsd::INTEGER).into()),
            json!({
                "type": "literal",
                "value": "2002",
                "datatype": "http://www.w3.org/2001/XMLSchema#integer"
            })
        );
        assert_eq!(
            to_json(Literal::new_language_tagged_literal_unchecked("Paris", "fr").into()),
            json!({"type": "literal", "value": "Paris", "xml:lang": "fr"})
        );
    }

    #[test]
    fn encode_document_with_gaps() {
        let mut row = BindingRow::new();
        row.insert("e", NamedNode::new_unchecked("http://example.org/A"));
        let response = QueryResponse {
            variables: vec![Variable::new_unchecked("e"), Variable::new_unchecked("d")],
            rows: vec![row],
            knowledge_gaps: Some(vec![KnowledgeGap::new(
                "?e <http://example.org/occurredAt> ?d .",
                vec![vec!["?e <http://example.org/occurredAt> ?d".to_owned()]],
            )]),
        };

        let json = serde_json::to_value(SparqlResultsDocument::from(response)).unwrap();
        assert_eq!(
            json,
            json!({
                "head": {"vars": ["e", "d"]},
                "results": {"bindings": [{"e": {"type": "uri", "value": "http://example.org/A"}}]},
                "knowledge_gaps": [{
                    "pattern": "?e <http://example.org/occurredAt> ?d .",
                    "gaps": [["?e <http://example.org/occurredAt> ?d"]]
                }]
            })
        );
    }

    #[test]
    fn encode_document_without_gaps() {
        let response = QueryResponse {
            variables: vec![Variable::new_unchecked("e")],
            rows: vec![],
            knowledge_gaps: None,
        };

        let json = serde_json::to_value(SparqlResultsDocument::from(response)).unwrap();
        assert_eq!(
            json,
            json!({"head": {"vars": ["e"]}, "results": {"bindings": []}})
        );
    }
}
