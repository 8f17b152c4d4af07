use anyhow::Context;
use std::collections::HashSet;
use std::path::PathBuf;

/// Small demo universe of US-listed low-priced names.
pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "ABCL", "SLDB", "SBET", "OKLO", "UEC", "LUNR", "SGMO", "SVM", "ACHR", "BITF",
];

#[derive(Debug, Clone, Default)]
pub struct UniverseOptions {
    /// Comma-separated list from the command line.
    pub symbols_arg: Option<String>,

    /// One ticker per line; `#` starts a comment.
    pub symbols_file: Option<PathBuf>,

    /// Comma-separated list from `SCREENER_SYMBOLS`.
    pub symbols_env: Option<String>,
}

/// Resolves the ticker list: command line, then file, then environment, then the built-in list.
pub fn resolve_universe(opts: &UniverseOptions) -> anyhow::Result<Vec<String>> {
    let symbols = if let Some(s) = opts.symbols_arg.as_deref() {
        normalize(s.split(','))
    } else if let Some(path) = opts.symbols_file.as_ref() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read symbols file {}", path.display()))?;
        parse_symbols_file(&text)
    } else if let Some(s) = opts.symbols_env.as_deref() {
        normalize(s.split(','))
    } else {
        normalize(DEFAULT_SYMBOLS.iter().copied())
    };

    anyhow::ensure!(!symbols.is_empty(), "symbol universe is empty");
    Ok(symbols)
}

fn parse_symbols_file(text: &str) -> Vec<String> {
    normalize(
        text.lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(|line| line.split(',')),
    )
}

// Trim, upper-case, drop blanks and keep the first occurrence of each ticker.
fn normalize<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
