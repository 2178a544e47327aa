mod rdfxml;

pub use rdfxml::render;

use oxrdf::Triple;
use oxrdfio::{RdfFormat, RdfParser};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SkosError;
use crate::graph::SkosGraph;
use crate::params::OutputTarget;

/// RDF/XML layout flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Typed node elements (`<skos:Concept rdf:about=...>`).
    Pretty,
    /// Plain `rdf:Description` nodes with explicit `rdf:type` properties.
    Xml,
}

impl FromStr for OutputFormat {
    type Err = SkosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "pretty-xml" => Ok(OutputFormat::Pretty),
            "xml" | "rdf/xml" => Ok(OutputFormat::Xml),
            other => Err(SkosError::Configuration(format!(
                "Unknown output format '{}' (expected 'pretty' or 'xml')",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Xml => write!(f, "xml"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Utf8,
    Iso88591,
}

impl OutputEncoding {
    /// Name written into the XML declaration.
    pub fn label(&self) -> &'static str {
        match self {
            OutputEncoding::Utf8 => "utf-8",
            OutputEncoding::Iso88591 => "iso-8859-1",
        }
    }

    /// Encode a rendered document. Characters outside Latin-1 become
    /// numeric character references.
    pub fn encode(&self, document: &str) -> Vec<u8> {
        match self {
            OutputEncoding::Utf8 => document.as_bytes().to_vec(),
            OutputEncoding::Iso88591 => {
                let mut bytes = Vec::with_capacity(document.len());
                for c in document.chars() {
                    let code = c as u32;
                    if code <= 0xFF {
                        bytes.push(code as u8);
                    } else {
                        bytes.extend_from_slice(format!("&#x{:X};", code).as_bytes());
                    }
                }
                bytes
            }
        }
    }
}

impl FromStr for OutputEncoding {
    type Err = SkosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(OutputEncoding::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Ok(OutputEncoding::Iso88591),
            other => Err(SkosError::Configuration(format!(
                "Unknown output encoding '{}' (expected 'utf-8' or 'iso-8859-1')",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `root / dir / name`, with `.xml` appended unless `name` already ends in it.
///
/// An absolute `dir` replaces `root`, following [`Path::join`].
pub fn output_file_path(root: &Path, dir: &Path, name: &str) -> PathBuf {
    let mut path = root.join(dir).join(name);
    let is_xml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    if !is_xml {
        let mut file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        file_name.push(".xml");
        path.set_file_name(file_name);
    }
    path
}

/// Render and encode the graph for `target`.
pub fn to_bytes(graph: &SkosGraph, target: &OutputTarget) -> Result<Vec<u8>, SkosError> {
    let document = render(graph, target.format, target.encoding)?;
    Ok(target.encoding.encode(&document))
}

/// Serialize the graph to `target.path`, creating parent directories.
pub async fn write_graph(graph: &SkosGraph, target: &OutputTarget) -> Result<(), SkosError> {
    let bytes = to_bytes(graph, target)?;

    if let Some(parent) = target.path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&target.path, &bytes).await?;

    tracing::info!(
        "Wrote {} triples to {} ({}, {})",
        graph.len(),
        target.path.display(),
        target.format,
        target.encoding
    );
    Ok(())
}

/// Rewrite a Latin-1 document as UTF-8 so the RDF/XML parser can read it.
fn to_utf8(bytes: Vec<u8>) -> Vec<u8> {
    let prolog_end = bytes
        .windows(2)
        .take(200)
        .position(|w| w == b"?>")
        .map(|i| i + 2);
    let Some(prolog_end) = prolog_end else {
        return bytes;
    };
    let prolog = String::from_utf8_lossy(&bytes[..prolog_end]).to_ascii_lowercase();
    if !(prolog.contains("iso-8859-1") || prolog.contains("latin1")) {
        return bytes;
    }

    tracing::debug!("Transcoding Latin-1 document to UTF-8");
    let body: String = bytes[prolog_end..].iter().map(|&b| b as char).collect();
    format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>{}", body).into_bytes()
}

/// Parse an RDF/XML file back into a graph.
pub fn read_rdf_xml(path: &Path) -> Result<SkosGraph, SkosError> {
    tracing::info!("Reading RDF/XML from {}", path.display());
    let bytes = to_utf8(std::fs::read(path)?);

    let triples = RdfParser::from_format(RdfFormat::RdfXml)
        .for_reader(bytes.as_slice())
        .map(|quad| {
            quad.map(Triple::from)
                .map_err(|e| SkosError::Parse(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Parsed {} triples", triples.len());
    Ok(SkosGraph::from_triples(triples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::tests::{test_scheme, SequentialAllocator};
    use crate::concept::{create_concept, define_scheme, ConceptDraft};
    use crate::graph::vocab;
    use crate::types::ConceptKind;
    use oxrdf::NamedNode;
    use tempfile::TempDir;

    fn sample_graph() -> (SkosGraph, NamedNode, NamedNode) {
        let scheme = test_scheme();
        let mut graph = SkosGraph::new();
        let mut allocator = SequentialAllocator::default();
        define_scheme(&scheme, &mut graph);
        let main = create_concept(
            ConceptDraft {
                kind: ConceptKind::Main,
                label: "Région – Côte-Nord",
                definition: "Œuvres & régions",
                notes: "",
                is_top_concept: true,
                narrower_of: None,
            },
            &mut graph,
            &scheme,
            &mut allocator,
        )
        .unwrap();
        let item = create_concept(
            ConceptDraft {
                kind: ConceptKind::Item,
                label: "Baie-Comeau",
                definition: "",
                notes: "ville",
                is_top_concept: false,
                narrower_of: Some(&main),
            },
            &mut graph,
            &scheme,
            &mut allocator,
        )
        .unwrap();
        (graph, main, item)
    }

    fn target(dir: &TempDir, format: OutputFormat, encoding: OutputEncoding) -> OutputTarget {
        OutputTarget {
            path: dir.path().join("nested").join("out.xml"),
            format,
            encoding,
        }
    }

    #[test]
    fn test_output_file_path() {
        let root = Path::new("/workspaces");
        assert_eq!(
            output_file_path(root, Path::new("skos"), "thesaurus"),
            PathBuf::from("/workspaces/skos/thesaurus.xml")
        );
        assert_eq!(
            output_file_path(root, Path::new("skos"), "thesaurus.xml"),
            PathBuf::from("/workspaces/skos/thesaurus.xml")
        );
        assert_eq!(
            output_file_path(root, Path::new("skos"), "thesaurus.rdf"),
            PathBuf::from("/workspaces/skos/thesaurus.rdf.xml")
        );
        assert_eq!(
            output_file_path(root, Path::new("/tmp/out"), "t"),
            PathBuf::from("/tmp/out/t.xml")
        );
    }

    #[test]
    fn test_parse_format_and_encoding() {
        assert_eq!("Pretty".parse::<OutputFormat>().unwrap(), OutputFormat::Pretty);
        assert_eq!("xml".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
        assert!("turtle".parse::<OutputFormat>().is_err());

        assert_eq!("UTF-8".parse::<OutputEncoding>().unwrap(), OutputEncoding::Utf8);
        assert_eq!(
            "latin1".parse::<OutputEncoding>().unwrap(),
            OutputEncoding::Iso88591
        );
        assert!("utf-16".parse::<OutputEncoding>().is_err());
    }

    #[test]
    fn test_latin1_encoding() {
        let bytes = OutputEncoding::Iso88591.encode("é – x");
        assert_eq!(bytes, b"\xE9 &#x2013; x".to_vec());
        assert_eq!(OutputEncoding::Utf8.encode("é"), "é".as_bytes().to_vec());
    }

    #[tokio::test]
    async fn test_round_trip_both_flavors() {
        let (graph, main, item) = sample_graph();
        let dir = TempDir::new().unwrap();

        for (format, encoding) in [
            (OutputFormat::Pretty, OutputEncoding::Utf8),
            (OutputFormat::Xml, OutputEncoding::Iso88591),
        ] {
            let target = target(&dir, format, encoding);
            write_graph(&graph, &target).await.unwrap();

            let parsed = read_rdf_xml(&target.path).unwrap();
            assert_eq!(parsed.len(), graph.len());
            for triple in graph.triples() {
                assert!(parsed.contains(triple), "missing {} ({})", triple, format);
            }
            assert_eq!(parsed.narrower_of(&main), vec![&item]);
            assert_eq!(parsed.label_of(&main), Some("Région – Côte-Nord"));
            assert_eq!(parsed.instances_of(vocab::CONCEPT).len(), 2);
        }
    }

    #[test]
    fn test_read_rejects_malformed_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xml");
        std::fs::write(
            &path,
            "<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\
             <rdf:Description rdf:about=\"http://example.org/a\"></rdf:RDF>",
        )
        .unwrap();
        assert!(matches!(read_rdf_xml(&path), Err(SkosError::Parse(_))));
    }
}
