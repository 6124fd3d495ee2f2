//! Built-in proxy list sources and custom source files

use crate::error::{Error, Result};
use crate::proxy::models::Source;
use std::fs;
use std::path::Path;
use url::Url;

const BUILTIN_SOURCES: &[(&str, &str)] = &[
    // GitHub raw
    ("TheSpeedX-http", "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt"),
    ("TheSpeedX-https", "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/https.txt"),
    ("monosans-http", "https://raw.githubusercontent.com/monosans/proxy-list/main/proxies/http.txt"),
    ("monosans-https", "https://raw.githubusercontent.com/monosans/proxy-list/main/proxies/https.txt"),
    ("clarketm-raw", "https://raw.githubusercontent.com/clarketm/proxy-list/master/proxy-list-raw.txt"),
    ("jetkai-http", "https://raw.githubusercontent.com/jetkai/proxy-list/main/online-proxies/txt/proxies-http.txt"),
    ("suny9577-raw", "https://raw.githubusercontent.com/sunny9577/proxy-scraper/master/proxies.txt"),
    ("roosterkid-https", "https://raw.githubusercontent.com/roosterkid/openproxylist/main/HTTPS_RAW.txt"),
    ("opsxcq-raw", "https://raw.githubusercontent.com/opsxcq/proxy-list/master/list.txt"),
    ("proxy4parsing-http", "https://raw.githubusercontent.com/proxy4parsing/proxy-list/main/http.txt"),
    ("rdavydov-http", "https://raw.githubusercontent.com/rdavydov/proxy-list/main/proxies/http.txt"),
    ("rdavydov-anon-http", "https://raw.githubusercontent.com/rdavydov/proxy-list/main/proxies_anonymous/http.txt"),
    ("proxifly-http", "https://raw.githubusercontent.com/proxifly/free-proxy-list/main/proxies/protocols/http/data.txt"),
    ("proxifly-https", "https://raw.githubusercontent.com/proxifly/free-proxy-list/main/proxies/protocols/https/data.txt"),
    // APIs
    ("proxyscrape-http", "https://api.proxyscrape.com/v2/?request=getproxies&protocol=http&timeout=10000&country=all&ssl=all&anonymity=all"),
    ("proxyscrape-https", "https://api.proxyscrape.com/v2/?request=getproxies&protocol=https&timeout=10000&country=all&ssl=all&anonymity=all"),
    ("proxy-list-download-http", "https://www.proxy-list.download/api/v1/get?type=http"),
    ("proxy-list-download-https", "https://www.proxy-list.download/api/v1/get?type=https"),
    ("proxyscan-http", "https://www.proxyscan.io/download?type=http"),
    ("proxyscan-https", "https://www.proxyscan.io/download?type=https"),
    ("openproxylist-http", "https://api.openproxylist.xyz/http.txt"),
    ("openproxylist-https", "https://api.openproxylist.xyz/https.txt"),
    ("proxyspace-http", "https://proxyspace.pro/http.txt"),
    ("spysme", "http://spys.me/proxy.txt"),
    ("rootjazz", "http://rootjazz.com/proxies/proxies.txt"),
];

/// Get the built-in list of public proxy list endpoints
pub fn builtin_sources() -> Vec<Source> {
    BUILTIN_SOURCES
        .iter()
        .map(|(name, url)| Source::new(name, url))
        .collect()
}

/// Parse a single source file line
///
/// Supports formats:
/// - URL
/// - NAME=URL
///
/// Blank lines, `#` comments and lines whose URL does not parse yield `None`.
pub fn parse_source_line(line: &str) -> Option<Source> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (name, url) = match line.split_once('=') {
        // `=` inside a query string of a bare URL is not a name separator
        Some((name, url)) if !name.contains("://") => (name.trim(), url.trim()),
        _ => ("", line),
    };

    Url::parse(url).ok()?;

    let name = if name.is_empty() { url } else { name };
    Some(Source::new(name, url))
}

/// Parse sources from a string (multiple lines)
pub fn parse_sources(content: &str) -> Vec<Source> {
    content.lines().filter_map(parse_source_line).collect()
}

/// Load sources from a file.
///
/// An unreadable file is an error; an empty or all-invalid file yields an
/// empty list.
pub fn load_sources_file<P: AsRef<Path>>(path: P) -> Result<Vec<Source>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::SourceFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_sources(&content))
}

/// Pick the sources for a run: the custom file if given and non-empty,
/// otherwise the built-in list.
pub fn resolve_sources<P: AsRef<Path>>(custom: Option<P>) -> Result<Vec<Source>> {
    let Some(path) = custom else {
        return Ok(builtin_sources());
    };
    let loaded = load_sources_file(&path)?;
    if loaded.is_empty() {
        tracing::warn!(
            path = %path.as_ref().display(),
            "source file has no usable entries, using built-in list"
        );
        return Ok(builtin_sources());
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_sources_mixed_file() {
        let content = "# comment\nhttp://a\nLabel=http://b\n\nnot a url\n";
        let sources = parse_sources(content);
        assert_eq!(
            sources,
            vec![Source::new("http://a", "http://a"), Source::new("Label", "http://b")]
        );
    }

    #[test]
    fn test_parse_source_line_trims_name_and_url() {
        let source = parse_source_line("  mine =  https://example.com/list.txt ").unwrap();
        assert_eq!(source.name, "mine");
        assert_eq!(source.url, "https://example.com/list.txt");
    }

    #[test]
    fn test_parse_source_line_bare_url_with_query() {
        let url = "https://www.proxy-list.download/api/v1/get?type=http";
        let source = parse_source_line(url).unwrap();
        assert_eq!(source.name, url);
        assert_eq!(source.url, url);
    }

    #[test]
    fn test_parse_source_line_named_url_with_query() {
        let source = parse_source_line("dl=https://example.com/get?type=http").unwrap();
        assert_eq!(source.name, "dl");
        assert_eq!(source.url, "https://example.com/get?type=http");
    }

    #[test]
    fn test_parse_source_line_empty_name_falls_back_to_url() {
        let source = parse_source_line("=http://b").unwrap();
        assert_eq!(source.name, "http://b");
    }

    #[test]
    fn test_parse_source_line_rejects_invalid() {
        assert!(parse_source_line("").is_none());
        assert!(parse_source_line("# http://a").is_none());
        assert!(parse_source_line("not a url").is_none());
        assert!(parse_source_line("name=also not a url").is_none());
    }

    #[test]
    fn test_builtin_sources_are_valid() {
        let sources = builtin_sources();
        assert_eq!(sources.len(), 25);
        for source in &sources {
            assert!(!source.name.is_empty());
            assert!(Url::parse(&source.url).is_ok(), "bad url {}", source.url);
        }
    }

    #[test]
    fn test_load_sources_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sources_file(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::SourceFile { .. }));
    }

    #[test]
    fn test_resolve_sources_falls_back_on_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        let sources = resolve_sources(Some(file.path())).unwrap();
        assert_eq!(sources, builtin_sources());
    }

    #[test]
    fn test_resolve_sources_uses_custom_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mine=http://127.0.0.1:9/list").unwrap();
        let sources = resolve_sources(Some(file.path())).unwrap();
        assert_eq!(sources, vec![Source::new("mine", "http://127.0.0.1:9/list")]);
    }

    #[test]
    fn test_resolve_sources_without_file_is_builtin() {
        let sources = resolve_sources(None::<&Path>).unwrap();
        assert_eq!(sources.len(), 25);
    }
}
