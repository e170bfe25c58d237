/// What the raw query text asks for: free-text project search, direct
/// selection of a project path (`-o`), or configuration management (`-c`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    Search(String),
    Open(String),
    Config,
}

/// Prefix matching is case-insensitive. The `-o` remainder has all double
/// quotes stripped and surrounding whitespace trimmed; everything after a
/// `-c` prefix is ignored.
pub fn parse_query(raw: &str) -> QueryIntent {
    let trimmed = raw.trim_start();
    let lower = trimmed.to_lowercase();

    if lower.starts_with("-o") {
        let rest = trimmed[2..].replace('"', "");
        return QueryIntent::Open(rest.trim().to_string());
    }

    if lower.starts_with("-c") {
        return QueryIntent::Config;
    }

    QueryIntent::Search(raw.trim().to_string())
}
