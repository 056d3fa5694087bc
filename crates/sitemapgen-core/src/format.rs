//! Sitemap XML rendering.
//!
//! Pure functions producing the exact fragments written to disk. The size
//! estimator measures these same fragments, so any change here changes chunk
//! boundaries too.
//!
//! ```rust
//! use sitemapgen_core::format;
//!
//! let entry = format::file_entry("https://example.org/A&B", "2024-01-15T10:30:00Z", "0.5");
//! assert!(entry.contains("<loc>https://example.org/A&amp;B</loc>"));
//! ```

/// Sitemap schema namespace.
pub const XML_SCHEMA: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const XML_HEAD: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Opening of a sitemap index file.
#[must_use]
pub fn open_index() -> String {
    format!("{XML_HEAD}<sitemapindex xmlns=\"{XML_SCHEMA}\">\n")
}

/// One `<sitemap>` row of the index.
#[must_use]
pub fn index_entry(url: &str, lastmod: &str) -> String {
    format!(
        "\t<sitemap>\n\t\t<loc>{}</loc>\n\t\t<lastmod>{lastmod}</lastmod>\n\t</sitemap>\n",
        html_escape::encode_quoted_attribute(url)
    )
}

/// Closing of a sitemap index file.
#[must_use]
pub const fn close_index() -> &'static str {
    "</sitemapindex>\n"
}

/// Opening of a sitemap (chunk) file.
#[must_use]
pub fn open_file() -> String {
    format!("{XML_HEAD}<urlset xmlns=\"{XML_SCHEMA}\">\n")
}

/// One `<url>` entry. The URL is escaped; it may carry `&` from query strings.
#[must_use]
pub fn file_entry(url: &str, lastmod: &str, priority: &str) -> String {
    format!(
        "\t<url>\n\t\t<loc>{}</loc>\n\t\t<lastmod>{lastmod}</lastmod>\n\t\t<priority>{priority}</priority>\n\t</url>\n",
        html_escape::encode_quoted_attribute(url)
    )
}

/// Closing of a sitemap (chunk) file.
#[must_use]
pub const fn close_file() -> &'static str {
    "</urlset>\n"
}
