use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::domain::{MetadataRecord, NOT_AVAILABLE};
use crate::error::KiraError;

const COLLECTION_DATE: &str = "collection_date";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Organism,
    CollectionDate,
    ServiceError,
}

/// Extracts accession, organism name and collection date from the first
/// `BioSample` of an efetch `rettype=xml` payload.
pub fn parse_biosample_xml(xml: &str) -> Result<MetadataRecord, KiraError> {
    let mut reader = Reader::from_str(xml);

    let mut path: Vec<String> = Vec::new();
    let mut sample_depth: Option<usize> = None;
    let mut capture: Option<(Capture, usize)> = None;
    let mut text = String::new();

    let mut accession: Option<String> = None;
    let mut organism: Option<String> = None;
    let mut collection_date: Option<String> = None;
    let mut service_error: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                let has_date = collection_date.is_some();
                let target = classify(&name, &element, &path, sample_depth, has_date)?;
                if name == "BioSample" && sample_depth.is_none() {
                    accession = attribute_value(&element, b"accession")?;
                    sample_depth = Some(path.len() + 1);
                }
                path.push(name);
                if let Some(target) = target {
                    capture = Some((target, path.len()));
                    text.clear();
                }
            }
            Ok(Event::Empty(element)) => {
                let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                if name == "BioSample" && sample_depth.is_none() {
                    accession = attribute_value(&element, b"accession")?;
                    sample_depth = Some(path.len() + 1);
                    break;
                }
                let has_date = collection_date.is_some();
                let target = classify(&name, &element, &path, sample_depth, has_date)?;
                match target {
                    Some(Capture::Organism) => organism = Some(String::new()),
                    Some(Capture::CollectionDate) => collection_date = Some(String::new()),
                    Some(Capture::ServiceError) => service_error = Some(String::new()),
                    None => {}
                }
            }
            Ok(Event::Text(content)) => {
                if capture.is_some() {
                    let value = content
                        .unescape()
                        .map_err(|err| KiraError::RecordParse(err.to_string()))?;
                    text.push_str(&value);
                }
            }
            Ok(Event::CData(content)) => {
                if capture.is_some() {
                    text.push_str(&String::from_utf8_lossy(&content));
                }
            }
            Ok(Event::End(_)) => {
                if let Some((target, depth)) = capture {
                    if depth == path.len() {
                        let value = std::mem::take(&mut text).trim().to_string();
                        match target {
                            Capture::Organism => organism = Some(value),
                            Capture::CollectionDate => collection_date = Some(value),
                            Capture::ServiceError => service_error = Some(value),
                        }
                        capture = None;
                    }
                }
                if sample_depth == Some(path.len()) {
                    break;
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(KiraError::RecordParse(format!(
                    "invalid XML at byte {}: {err}",
                    reader.error_position()
                )));
            }
            Ok(_) => {}
        }
    }

    if let Some(message) = service_error {
        return Err(KiraError::NcbiService(message));
    }
    if sample_depth.is_none() {
        return Err(KiraError::RecordParse(
            "response contains no BioSample element".to_string(),
        ));
    }
    let accession = accession.ok_or_else(|| {
        KiraError::RecordParse("BioSample element has no accession attribute".to_string())
    })?;
    let organism = organism.ok_or_else(|| {
        KiraError::RecordParse("missing Description/Organism/OrganismName".to_string())
    })?;

    Ok(MetadataRecord {
        biosample_id: accession,
        organism,
        collection_date: collection_date.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    })
}

fn classify(
    name: &str,
    element: &BytesStart<'_>,
    path: &[String],
    sample_depth: Option<usize>,
    has_date: bool,
) -> Result<Option<Capture>, KiraError> {
    if name == "ERROR" {
        return Ok(Some(Capture::ServiceError));
    }
    let Some(depth) = sample_depth else {
        return Ok(None);
    };
    let inner = &path[depth.min(path.len())..];
    match name {
        "OrganismName" if inner == ["Description", "Organism"] => Ok(Some(Capture::Organism)),
        "Attribute" if inner == ["Attributes"] && !has_date => {
            let is_date = attribute_value(element, b"attribute_name")?
                .map(|value| value.eq_ignore_ascii_case(COLLECTION_DATE))
                .unwrap_or(false);
            Ok(is_date.then_some(Capture::CollectionDate))
        }
        _ => Ok(None),
    }
}

fn attribute_value(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, KiraError> {
    let attribute = element
        .try_get_attribute(key)
        .map_err(|err| KiraError::RecordParse(err.to_string()))?;
    attribute
        .map(|attr| {
            attr.unescape_value()
                .map(|value| value.into_owned())
                .map_err(|err| KiraError::RecordParse(err.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn only_first_sample_is_read() {
        let xml = r#"<BioSampleSet>
<BioSample accession="SAMN1"><Description><Organism><OrganismName>Mus musculus</OrganismName></Organism></Description></BioSample>
<BioSample accession="SAMN2"><Description><Organism><OrganismName>Homo sapiens</OrganismName></Organism></Description></BioSample>
</BioSampleSet>"#;
        let record = parse_biosample_xml(xml).unwrap();
        assert_eq!(record.biosample_id, "SAMN1");
        assert_eq!(record.organism, "Mus musculus");
        assert_eq!(record.collection_date, NOT_AVAILABLE);
    }

    #[test]
    fn organism_name_outside_description_is_ignored() {
        let xml = r#"<BioSampleSet><BioSample accession="SAMN1">
<Attributes><Attribute attribute_name="host">
</Attribute></Attributes>
<OrganismName>stray</OrganismName>
</BioSample></BioSampleSet>"#;
        let err = parse_biosample_xml(xml).unwrap_err();
        assert_matches!(err, KiraError::RecordParse(_));
    }

    #[test]
    fn empty_collection_date_attribute() {
        let xml = r#"<BioSampleSet><BioSample accession="SAMN1">
<Description><Organism><OrganismName>Danio rerio</OrganismName></Organism></Description>
<Attributes><Attribute attribute_name="collection_date"/></Attributes>
</BioSample></BioSampleSet>"#;
        let record = parse_biosample_xml(xml).unwrap();
        assert_eq!(record.collection_date, "");
    }

    #[test]
    fn text_split_by_comment_or_cdata_keeps_inner_whitespace() {
        let xml = r#"<BioSampleSet><BioSample accession="SAMN1">
<Description><Organism><OrganismName>
  Homo <!-- curated -->sapiens
</OrganismName></Organism></Description>
<Attributes><Attribute attribute_name="collection_date"><![CDATA[2020-01]]> <?note?>-01</Attribute></Attributes>
</BioSample></BioSampleSet>"#;
        let record = parse_biosample_xml(xml).unwrap();
        assert_eq!(record.organism, "Homo sapiens");
        assert_eq!(record.collection_date, "2020-01 -01");
    }

    #[test]
    fn escaped_text_is_unescaped() {
        let xml = r#"<BioSampleSet><BioSample accession="SAMN1">
<Description><Organism><OrganismName>Bacteria &amp; Archaea</OrganismName></Organism></Description>
</BioSample></BioSampleSet>"#;
        let record = parse_biosample_xml(xml).unwrap();
        assert_eq!(record.organism, "Bacteria & Archaea");
    }
}
