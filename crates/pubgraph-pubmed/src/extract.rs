//! Record extraction from efetch XML
//!
//! One `PubmedArticleSet` holding exactly one `PubmedArticle` is turned into a
//! [`Record`]. The skeleton (root shape, the `MedlineCitation`/`PubmedData`
//! pair, matching PMID, mandatory `PubmedData` children, article title) must be
//! present; journal, date, abstract, publication types and references are
//! optional and degrade to nulls or empty lists.

use pubgraph_core::Cell;

use crate::error::ExtractError;
use crate::record::{
    ARTICLE_ID_PREFIX, Fields, PUBLICATION_TYPE_PREFIX, Pmid, Record, TextKind, TextSegment,
};
use crate::xml::{Element, parse_document};

/// Id scheme whose references become citation edges
pub const CITATION_SCHEME: &str = "pubmed";

const ROOT: &str = "PubmedArticleSet";
const CITATION: &str = "MedlineCitation";
const PUBMED_DATA: &str = "PubmedData";

/// Extract the record for `expected_id` from a raw efetch document.
pub fn extract(xml: &str, expected_id: Pmid) -> Result<Record, ExtractError> {
    let root = parse_document(xml)?;
    let (citation, pubmed_data) = split_article(&root)?;

    check_pmid(citation, expected_id)?;

    for name in ["PublicationStatus", "ArticleIdList"] {
        if !pubmed_data.has_child(name) {
            return Err(ExtractError::malformed(format!(
                "{PUBMED_DATA} has no {name}"
            )));
        }
    }

    let article = citation
        .child("Article")
        .ok_or_else(|| ExtractError::malformed(format!("{CITATION} has no Article")))?;
    let title = article
        .child("ArticleTitle")
        .ok_or_else(|| ExtractError::malformed("Article has no ArticleTitle"))?;

    let texts = extract_texts(title, article.child("Abstract"));

    let mut fields = Fields::new();
    fields.insert(
        "publication_status",
        pubmed_data.child("PublicationStatus").and_then(Element::text),
    );

    let journal = article.child("Journal");
    fields.insert("journal_issn", journal_text(journal, "ISSN"));
    fields.insert("journal_name", journal_text(journal, "Title"));

    let date = article
        .child("ArticleDate")
        .or_else(|| citation.child("DateCompleted"));
    fields.insert("date", date.map(compose_date).transpose()?);

    if let Some(ids) = pubmed_data.child("ArticleIdList") {
        for aid in &ids.children {
            let id_type = aid.attr("IdType").ok_or_else(|| {
                ExtractError::validation(format!("{} without IdType", aid.name))
            })?;
            fields.insert(format!("{ARTICLE_ID_PREFIX}{id_type}"), aid.text());
        }
    }

    if let Some(types) = article.child("PublicationTypeList") {
        for pt in &types.children {
            let ui = pt.attr("UI").ok_or_else(|| {
                ExtractError::validation(format!("{} without UI", pt.name))
            })?;
            fields.insert(format!("{PUBLICATION_TYPE_PREFIX}{ui}"), Cell::Bool(true));
        }
    }

    let references = extract_references(pubmed_data.child("ReferenceList"))?;

    Ok(Record::populated(expected_id, fields, texts, references))
}

/// Check root shape and return the (citation, pubmed data) pair.
fn split_article(root: &Element) -> Result<(&Element, &Element), ExtractError> {
    if root.name != ROOT {
        return Err(ExtractError::malformed(format!(
            "root is <{}>, expected <{ROOT}>",
            root.name
        )));
    }
    let [entry] = root.children.as_slice() else {
        return Err(ExtractError::malformed(format!(
            "root has {} children, expected 1",
            root.children.len()
        )));
    };

    let names: Vec<&str> = entry.children.iter().map(|c| c.name.as_str()).collect();
    match names.as_slice() {
        [CITATION, PUBMED_DATA] => Ok((&entry.children[0], &entry.children[1])),
        [PUBMED_DATA, CITATION] => Ok((&entry.children[1], &entry.children[0])),
        _ => Err(ExtractError::malformed(format!(
            "<{}> children are {names:?}, expected exactly {CITATION} and {PUBMED_DATA}",
            entry.name
        ))),
    }
}

fn check_pmid(citation: &Element, expected_id: Pmid) -> Result<(), ExtractError> {
    let text = citation
        .child("PMID")
        .and_then(Element::text)
        .ok_or_else(|| ExtractError::malformed(format!("{CITATION} has no PMID")))?;
    let pmid: Pmid = text
        .trim()
        .parse()
        .map_err(|_| ExtractError::malformed(format!("PMID {text:?} is not an integer")))?;

    if pmid != expected_id {
        return Err(ExtractError::malformed(format!(
            "PMID {pmid} does not match requested {expected_id}"
        )));
    }
    Ok(())
}

fn journal_text<'a>(journal: Option<&'a Element>, name: &str) -> Option<&'a str> {
    journal?.child(name)?.text()
}

/// `Year-Month-Day` from raw component text, no padding or calendar checks
fn compose_date(date: &Element) -> Result<String, ExtractError> {
    let part = |name: &str| {
        date.child(name)
            .and_then(Element::text)
            .ok_or_else(|| ExtractError::validation(format!("{} has no {name}", date.name)))
    };
    Ok(format!("{}-{}-{}", part("Year")?, part("Month")?, part("Day")?))
}

fn extract_texts(title: &Element, abstract_: Option<&Element>) -> Vec<TextSegment> {
    let mut texts = vec![TextSegment {
        kind: TextKind::Title,
        order: 0,
        content: title.text().unwrap_or_default().to_string(),
    }];

    let paragraphs = abstract_.map(|a| a.children.as_slice()).unwrap_or_default();
    for (order, para) in paragraphs.iter().enumerate() {
        let mut content = match para.attr("Label") {
            Some(label) => format!("{label}\n"),
            None => String::new(),
        };
        content.push_str(para.text().unwrap_or_default());

        texts.push(TextSegment {
            kind: TextKind::Abstract,
            order,
            content,
        });
    }

    texts
}

/// Cited PMIDs from the first `ReferenceList`, if any.
///
/// References without an `ArticleIdList` are skipped, as are ids in other
/// schemes (doi, pmc, ...).
fn extract_references(list: Option<&Element>) -> Result<Vec<Pmid>, ExtractError> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };

    let mut references = Vec::new();
    for reference in &list.children {
        let Some(ids) = reference.child("ArticleIdList") else {
            continue;
        };
        for aid in &ids.children {
            if aid.attr("IdType") != Some(CITATION_SCHEME) {
                continue;
            }
            let text = aid.text().unwrap_or_default();
            let pmid: Pmid = text.trim().parse().map_err(|_| {
                ExtractError::validation(format!("cited PMID {text:?} is not an integer"))
            })?;
            references.push(pmid);
        }
    }

    Ok(references)
}
