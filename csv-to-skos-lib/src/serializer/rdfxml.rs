use oxrdf::{NamedNode, Subject, Term, Triple};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;

use super::{OutputEncoding, OutputFormat};
use crate::error::SkosError;
use crate::graph::{vocab, SkosGraph};
use crate::types::{RDF_NS, SKOS_NS};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

const KNOWN_PREFIXES: [(&str, &str); 2] = [("rdf", RDF_NS), ("skos", SKOS_NS)];

fn serialization_error(e: impl std::fmt::Display) -> SkosError {
    SkosError::Serialization(e.to_string())
}

/// Split an IRI into namespace and an XML-safe local name.
fn split_iri(iri: &str) -> Option<(&str, &str)> {
    let split = iri.rfind(['#', '/'])? + 1;
    let (namespace, local) = iri.split_at(split);
    let mut chars = local.chars();
    let first = chars.next()?;
    if !(first.is_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return None;
    }
    Some((namespace, local))
}

/// Element name for a predicate or class, plus the namespace declaration
/// it needs when the namespace is not declared on the root element.
fn qualified_name(iri: &NamedNode) -> Result<(String, Option<String>), SkosError> {
    let (namespace, local) = split_iri(iri.as_str()).ok_or_else(|| {
        SkosError::Serialization(format!("Cannot express {} as an XML element name", iri))
    })?;
    match KNOWN_PREFIXES.iter().find(|(_, ns)| *ns == namespace) {
        Some((prefix, _)) => Ok((format!("{}:{}", prefix, local), None)),
        None => Ok((format!("ns1:{}", local), Some(namespace.to_string()))),
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#13;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn node_attribute(subject: &Subject) -> Result<(&'static str, String), SkosError> {
    match subject {
        Subject::NamedNode(node) => Ok(("rdf:about", node.as_str().to_string())),
        Subject::BlankNode(node) => Ok(("rdf:nodeID", node.as_str().to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(SkosError::Serialization(
            "Quoted triples cannot be written as RDF/XML".into(),
        )),
    }
}

/// Triples grouped by subject, subjects in order of first appearance.
fn group_by_subject(triples: &[Triple]) -> Vec<(&Subject, Vec<&Triple>)> {
    let mut index: HashMap<&Subject, usize> = HashMap::new();
    let mut groups: Vec<(&Subject, Vec<&Triple>)> = Vec::new();
    for triple in triples {
        match index.get(&triple.subject) {
            Some(&i) => groups[i].1.push(triple),
            None => {
                index.insert(&triple.subject, groups.len());
                groups.push((&triple.subject, vec![triple]));
            }
        }
    }
    groups
}

struct RdfXmlWriter {
    writer: Writer<Vec<u8>>,
    format: OutputFormat,
}

impl RdfXmlWriter {
    fn new(format: OutputFormat) -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
            format,
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), SkosError> {
        self.writer.write_event(event).map_err(serialization_error)
    }

    fn write_document(
        mut self,
        graph: &SkosGraph,
        encoding: OutputEncoding,
    ) -> Result<String, SkosError> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some(encoding.label()), None)))?;

        let mut root = BytesStart::new("rdf:RDF");
        for (prefix, namespace) in KNOWN_PREFIXES {
            root.push_attribute((format!("xmlns:{}", prefix).as_str(), namespace));
        }
        self.event(Event::Start(root))?;

        for (subject, triples) in group_by_subject(graph.triples()) {
            self.write_node(subject, &triples)?;
        }

        self.event(Event::End(BytesEnd::new("rdf:RDF")))?;

        String::from_utf8(self.writer.into_inner()).map_err(serialization_error)
    }

    fn write_node(&mut self, subject: &Subject, triples: &[&Triple]) -> Result<(), SkosError> {
        let typed_by = match self.format {
            OutputFormat::Pretty => triples.iter().position(|t| {
                t.predicate.as_ref() == vocab::RDF_TYPE
                    && matches!(&t.object, Term::NamedNode(class) if qualified_name(class).map(|(_, ns)| ns.is_none()).unwrap_or(false))
            }),
            OutputFormat::Xml => None,
        };

        let element = match typed_by.map(|i| &triples[i].object) {
            Some(Term::NamedNode(class)) => qualified_name(class)?.0,
            _ => "rdf:Description".to_string(),
        };

        let (attribute, value) = node_attribute(subject)?;
        let mut start = BytesStart::new(element.clone());
        start.push_attribute((attribute, value.as_str()));
        self.event(Event::Start(start))?;

        for (i, triple) in triples.iter().enumerate() {
            if Some(i) == typed_by {
                continue;
            }
            self.write_property(triple)?;
        }

        self.event(Event::End(BytesEnd::new(element)))
    }

    fn write_property(&mut self, triple: &Triple) -> Result<(), SkosError> {
        let (name, namespace) = qualified_name(&triple.predicate)?;
        let mut start = BytesStart::new(name.clone());
        if let Some(namespace) = &namespace {
            start.push_attribute(("xmlns:ns1", namespace.as_str()));
        }

        match &triple.object {
            Term::NamedNode(node) => {
                start.push_attribute(("rdf:resource", node.as_str()));
                self.event(Event::Empty(start))
            }
            Term::BlankNode(node) => {
                start.push_attribute(("rdf:nodeID", node.as_str()));
                self.event(Event::Empty(start))
            }
            Term::Literal(literal) => {
                if let Some(language) = literal.language() {
                    start.push_attribute(("xml:lang", language));
                } else {
                    let datatype = literal.datatype().as_str();
                    if datatype != XSD_STRING && datatype != RDF_LANG_STRING {
                        start.push_attribute(("rdf:datatype", datatype));
                    }
                }
                self.event(Event::Start(start))?;
                self.event(Event::Text(BytesText::from_escaped(escape_text(
                    literal.value(),
                ))))?;
                self.event(Event::End(BytesEnd::new(name)))
            }
            #[allow(unreachable_patterns)]
            _ => Err(SkosError::Serialization(
                "Quoted triples cannot be written as RDF/XML".into(),
            )),
        }
    }
}

/// Render the graph as an RDF/XML document whose declaration names `encoding`.
pub fn render(
    graph: &SkosGraph,
    format: OutputFormat,
    encoding: OutputEncoding,
) -> Result<String, SkosError> {
    RdfXmlWriter::new(format).write_document(graph, encoding)
}
