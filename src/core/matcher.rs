/// A compiled keyword list for one (source, destination) pair.
///
/// Keeps the original casing for reporting and a lowercased copy for
/// matching, so the lowercasing cost is paid once at build time.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<String>,
    lowered: Vec<String>,
}

impl KeywordSet {
    pub fn new(keywords: &[String]) -> Self {
        let keywords: Vec<String> = keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .collect();
        let lowered = keywords.iter().map(|k| k.to_lowercase()).collect();
        Self { keywords, lowered }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Keywords in their configured casing.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Keywords contained in `text`, case-insensitively.
    ///
    /// A multi-word keyword matches when every one of its words appears
    /// somewhere in the text; a single-word keyword is a plain substring
    /// check. Returned keywords keep their configured casing.
    pub fn matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        if text.is_empty() {
            return Vec::new();
        }

        let text_lower = text.to_lowercase();
        let mut matched = Vec::new();

        for (keyword, lowered) in self.keywords.iter().zip(&self.lowered) {
            let hit = if lowered.contains(' ') {
                lowered
                    .split_whitespace()
                    .all(|word| text_lower.contains(word))
            } else {
                text_lower.contains(lowered.as_str())
            };

            if hit {
                matched.push(keyword.as_str());
            }
        }

        matched
    }
}
