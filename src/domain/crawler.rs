//! Crawler classification for incoming redirect requests.
//!
//! Social-media unfurlers and search indexers get a preview page instead of
//! a redirect, and are never counted as clicks.

/// Decides whether a request comes from an automated client.
pub trait CrawlerDetector: Send + Sync {
    /// Returns true if `user_agent` identifies a crawler.
    ///
    /// A missing user agent is classified as human.
    fn is_crawler(&self, user_agent: Option<&str>) -> bool;
}

/// User-agent tokens of known link unfurlers and search crawlers.
pub const DEFAULT_CRAWLER_SIGNATURES: &[&str] = &[
    "facebookexternalhit",
    "facebot",
    "meta-externalagent",
    "twitterbot",
    "linkedinbot",
    "slackbot",
    "slack-imgproxy",
    "discordbot",
    "telegrambot",
    "whatsapp",
    "skypeuripreview",
    "pinterest",
    "redditbot",
    "embedly",
    "quora link preview",
    "vkshare",
    "iframely",
    "mastodon",
    "googlebot",
    "google-inspectiontool",
    "bingbot",
    "applebot",
    "duckduckbot",
    "yandexbot",
    "baiduspider",
    "ia_archiver",
];

/// Case-insensitive substring matcher over a list of signature tokens.
#[derive(Debug, Clone)]
pub struct SignatureCrawlerDetector {
    signatures: Vec<String>,
}

impl SignatureCrawlerDetector {
    /// Builds a detector from [`DEFAULT_CRAWLER_SIGNATURES`] plus `extra` tokens.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut signatures: Vec<String> = DEFAULT_CRAWLER_SIGNATURES
            .iter()
            .map(|s| s.to_string())
            .collect();

        for token in extra {
            let token = token.as_ref().trim().to_ascii_lowercase();
            if !token.is_empty() && !signatures.contains(&token) {
                signatures.push(token);
            }
        }

        Self { signatures }
    }

    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }
}

impl Default for SignatureCrawlerDetector {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<&str>())
    }
}

impl CrawlerDetector for SignatureCrawlerDetector {
    fn is_crawler(&self, user_agent: Option<&str>) -> bool {
        let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
            return false;
        };

        let ua = ua.to_ascii_lowercase();
        self.signatures.iter().any(|sig| ua.contains(sig.as_str()))
    }
}

/// Token matching plus woothee's user-agent parser.
///
/// Also catches crawlers missing from the signature list, such as search
/// engines woothee knows about.
pub struct ParsingCrawlerDetector {
    signatures: SignatureCrawlerDetector,
    parser: woothee::parser::Parser,
}

impl ParsingCrawlerDetector {
    pub fn new(signatures: SignatureCrawlerDetector) -> Self {
        Self {
            signatures,
            parser: woothee::parser::Parser::new(),
        }
    }
}

impl CrawlerDetector for ParsingCrawlerDetector {
    fn is_crawler(&self, user_agent: Option<&str>) -> bool {
        if self.signatures.is_crawler(user_agent) {
            return true;
        }

        user_agent
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
            .and_then(|ua| self.parser.parse(ua))
            .is_some_and(|parsed| parsed.category == "crawler")
    }
}
