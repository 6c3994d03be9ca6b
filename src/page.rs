/// Page the overlay is mounted on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContext {
    url: String,
    document_title: String,
}

impl PageContext {
    pub fn new(url: impl Into<String>, document_title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            document_title: document_title.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document_title(&self) -> &str {
        &self.document_title
    }

    /// Paper title derived from the document title, see [`arxiv_title`].
    pub fn paper_title(&self) -> Option<&str> {
        arxiv_title(&self.document_title)
    }
}

/// Strips the leading `[2401.01234] ` style id from an arXiv document title.
///
/// Returns `None` for an empty title or the bare site title `arXiv.org`.
pub fn arxiv_title(document_title: &str) -> Option<&str> {
    if document_title.is_empty() || document_title == "arXiv.org" {
        return None;
    }

    let title = document_title
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
        .map_or(document_title, |(_, tail)| tail.trim_start());

    Some(title)
}
