//! Per-page extraction results
//!
//! The extraction endpoint returns one entry per page. OCR text is loosely
//! typed on the wire (absent, a string, or an array of strings) and is
//! normalized here into [`OcrText`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text recognized in a page's images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OcrText {
    #[default]
    None,
    Single(String),
    Many(Vec<String>),
}

impl OcrText {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOcr {
    Single(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for OcrText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<RawOcr>::deserialize(deserializer)? {
            None => Self::None,
            Some(RawOcr::Single(text)) => Self::Single(text),
            Some(RawOcr::Many(items)) => Self::Many(items),
        })
    }
}

impl Serialize for OcrText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::None => serializer.serialize_none(),
            Self::Single(text) => serializer.serialize_str(text),
            Self::Many(items) => items.serialize(serializer),
        }
    }
}

/// Extraction result for a single page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_text: Option<String>,
    #[serde(default, skip_serializing_if = "OcrText::is_none")]
    pub image_ocr_text: OcrText,
}

impl PageResult {
    /// Body text, treating an empty string like a missing one
    pub fn body_text(&self) -> Option<&str> {
        self.pdf_text.as_deref().filter(|t| !t.is_empty())
    }

    /// Translatable fragments of this page, body text first
    pub fn fragments(&self) -> Vec<(Fragment, &str)> {
        let mut out = Vec::new();
        if let Some(text) = self.body_text() {
            out.push((Fragment::PdfText, text));
        }
        match &self.image_ocr_text {
            OcrText::None => {}
            OcrText::Single(text) => {
                if !text.is_empty() {
                    out.push((Fragment::Ocr, text.as_str()));
                }
            }
            OcrText::Many(items) => {
                for (idx, text) in items.iter().enumerate() {
                    if !text.is_empty() {
                        out.push((Fragment::OcrItem(idx), text.as_str()));
                    }
                }
            }
        }
        out
    }

    /// Replace one fragment in place. Returns false if the fragment does not
    /// exist on this page (shape changed since it was read).
    pub fn replace(&mut self, fragment: Fragment, text: String) -> bool {
        match (fragment, &mut self.image_ocr_text) {
            (Fragment::PdfText, _) => {
                if self.pdf_text.is_none() {
                    return false;
                }
                self.pdf_text = Some(text);
                true
            }
            (Fragment::Ocr, OcrText::Single(current)) => {
                *current = text;
                true
            }
            (Fragment::OcrItem(idx), OcrText::Many(items)) => match items.get_mut(idx) {
                Some(slot) => {
                    *slot = text;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

/// Which text field of a page a fragment refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fragment {
    PdfText,
    Ocr,
    OcrItem(usize),
}

/// A fragment address within a result set (page is 0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId {
    pub page: usize,
    pub fragment: Fragment,
}

/// Ordered per-page results, index-aligned with the document's pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet(Vec<PageResult>);

impl ResultSet {
    pub fn new(pages: Vec<PageResult>) -> Self {
        Self(pages)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Entry for a 1-based page number
    pub fn page(&self, page_number: usize) -> Option<&PageResult> {
        page_number.checked_sub(1).and_then(|idx| self.0.get(idx))
    }

    pub fn pages(&self) -> &[PageResult] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageResult> {
        self.0.iter()
    }

    /// All translatable fragments in pipeline order: page order, then
    /// body text before OCR text
    pub fn fragments(&self) -> Vec<(FragmentId, String)> {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(page, result)| {
                result.fragments().into_iter().map(move |(fragment, text)| {
                    (FragmentId { page, fragment }, text.to_string())
                })
            })
            .collect()
    }

    pub fn replace(&mut self, id: FragmentId, text: String) -> bool {
        self.0
            .get_mut(id.page)
            .is_some_and(|page| page.replace(id.fragment, text))
    }
}

impl From<Vec<PageResult>> for ResultSet {
    fn from(pages: Vec<PageResult>) -> Self {
        Self(pages)
    }
}
