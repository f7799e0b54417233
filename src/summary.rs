//! Timeline semantic aggregation.
//!
//! Folds the keywords and sentiment of a user's recent posts into per-word
//! statistics, drops noise words and ranks the rest by frequency.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;
use serde::Serialize;

use crate::error::SourceError;
use crate::nlp::KeywordSentimentExtractor;
use crate::twitter::{
    TimelineFetcher, TwitterApi, DEFAULT_TIMELINE_PAGES, DEFAULT_TIMELINE_PAGE_SIZE,
};

pub const DEFAULT_TOP_WORDS: usize = 50;

/// How often a word occurred and the mean sentiment of the posts it occurred in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordStat {
    pub word: String,
    pub count: u32,
    #[serde(rename = "avg_tweet_sentiment")]
    pub avg_sentiment: f64,
}

/// Running word statistics in first-seen order.
#[derive(Debug, Default)]
pub struct WordStats {
    index: HashMap<String, usize>,
    stats: Vec<WordStat>,
}

impl WordStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `word` in a post scored `sentiment`.
    ///
    /// The mean is updated incrementally: `avg' = (count * avg + s) / (count + 1)`.
    pub fn record(&mut self, word: &str, sentiment: f64) {
        match self.index.get(word) {
            Some(&i) => {
                let stat = &mut self.stats[i];
                let count = f64::from(stat.count);
                stat.avg_sentiment = (count * stat.avg_sentiment + sentiment) / (count + 1.0);
                stat.count += 1;
            }
            None => {
                self.index.insert(word.to_string(), self.stats.len());
                self.stats.push(WordStat {
                    word: word.to_string(),
                    count: 1,
                    avg_sentiment: sentiment,
                });
            }
        }
    }

    pub fn get(&self, word: &str) -> Option<&WordStat> {
        self.index.get(word).map(|&i| &self.stats[i])
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Drops noise words, sorts by count (highest first) and keeps `top_n`.
    /// Words with equal counts stay in the order they were first seen.
    pub fn into_ranked(self, top_n: usize) -> Vec<WordStat> {
        let mut ranked: Vec<WordStat> = self
            .stats
            .into_iter()
            .filter(|stat| !is_noise_word(&stat.word))
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(top_n);
        ranked
    }
}

/* ------------------------------ Noise words ------------------------------- */

const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Tokens that show up in post text as link fragments or tokenizer artifacts.
const NOISY_TOKENS: &[&str] = &[
    "rt", "http", "https", "amp", "&amp;", "t.co", "//t.co", "https://t.co", "http://t.co", "'s",
    "n't", "'re", "'m", "``", "''", "--", "...", "\u{2026}", "\u{2019}", "\u{2018}", "\u{201c}",
    "\u{201d}", "via",
];

/// Every stopword, noisy token and Unicode punctuation character, lowercased.
///
/// Punctuation means general category `P*` across all scalar values. Built on
/// first use.
static NOISE_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let mut set: HashSet<String> = ENGLISH_STOPWORDS
        .iter()
        .chain(NOISY_TOKENS.iter())
        .map(|w| w.to_lowercase())
        .collect();

    let punctuation = Regex::new(r"^\p{P}$").expect("punctuation class is a valid regex");
    let mut buf = [0u8; 4];
    for c in (0..=char::MAX as u32).filter_map(char::from_u32) {
        if punctuation.is_match(c.encode_utf8(&mut buf)) {
            set.insert(c.to_string());
        }
    }

    debug!("Noise word set holds {} entries", set.len());
    set
});

/// Case-insensitive membership in the noise word set.
pub fn is_noise_word(word: &str) -> bool {
    NOISE_WORDS.contains(&word.to_lowercase())
}

/* ------------------------------- Aggregator ------------------------------- */

/// Profile of a post author plus their ranked topical words.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub screen_name: String,
    pub description: String,
    pub avatar_url: String,
    pub words: Vec<WordStat>,
}

/// Window and ranking limits for an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationLimits {
    pub timeline_pages: usize,
    pub timeline_page_size: usize,
    pub top_words: usize,
}

impl Default for AggregationLimits {
    fn default() -> Self {
        AggregationLimits {
            timeline_pages: DEFAULT_TIMELINE_PAGES,
            timeline_page_size: DEFAULT_TIMELINE_PAGE_SIZE,
            top_words: DEFAULT_TOP_WORDS,
        }
    }
}

pub struct TimelineSemanticAggregator<'a> {
    api: &'a dyn TwitterApi,
    extractor: KeywordSentimentExtractor<'a>,
    limits: AggregationLimits,
}

impl<'a> TimelineSemanticAggregator<'a> {
    pub fn new(
        api: &'a dyn TwitterApi,
        extractor: KeywordSentimentExtractor<'a>,
        limits: AggregationLimits,
    ) -> Self {
        TimelineSemanticAggregator {
            api,
            extractor,
            limits,
        }
    }

    /// Summarizes the recent posts of `user_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(UserSummary)`: Profile fields and up to `top_words` ranked words
    /// - `Err(SourceError)`: If the profile, a timeline page or an NLP call fails
    pub async fn aggregate(&self, user_id: &str) -> Result<UserSummary, SourceError> {
        let profile = self.api.get_user(user_id).await?;
        let posts = TimelineFetcher::new(self.api)
            .fetch_window(
                user_id,
                self.limits.timeline_pages,
                self.limits.timeline_page_size,
            )
            .await?;

        let mut stats = WordStats::new();
        for post in &posts {
            let extraction = self.extractor.extract(post).await?;
            for word in &extraction.candidates {
                stats.record(word, extraction.sentiment);
            }
        }

        let distinct = stats.len();
        let words = stats.into_ranked(self.limits.top_words);
        info!(
            "Aggregated {} posts of @{}: {} distinct words, {} ranked",
            posts.len(),
            profile.screen_name,
            distinct,
            words.len()
        );

        Ok(UserSummary {
            name: profile.name,
            screen_name: profile.screen_name,
            description: profile.description,
            avatar_url: profile.avatar_url,
            words,
        })
    }
}
