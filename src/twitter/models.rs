//! Post and user types, plus decoding of the X API v1.1 status/user JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::SourceError;

/// Snowflake id of a post. Ordered the same way as creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(PostId)
    }
}

// Ids exceed the integer precision of JavaScript clients, so they go out as strings.
impl Serialize for PostId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A fetched post. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub hashtags: Vec<String>,
    pub urls: Vec<String>,
    pub author_id: String,
    pub author_screen_name: String,
    /// The post this one reposts, if it is a retweet wrapper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reposted: Option<Box<Post>>,
}

impl Post {
    /// Collapses a retweet wrapper to the post it reposts.
    ///
    /// Posts without a repost reference come back unchanged. The referenced post
    /// never carries a reference of its own, so applying this twice is the same as
    /// applying it once.
    pub fn normalized(self) -> Post {
        match self.reposted {
            Some(original) => *original,
            None => self,
        }
    }

    pub fn is_repost(&self) -> bool {
        self.reposted.is_some()
    }

    /// Canonical web URL of the post.
    pub fn url(&self) -> String {
        format!(
            "https://twitter.com/{}/status/{}",
            self.author_screen_name, self.id
        )
    }
}

/// Profile fields shown next to the word summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub screen_name: String,
    pub name: String,
    pub description: String,
    pub avatar_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStatus {
    id_str: String,
    created_at: String,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    entities: RawEntities,
    user: RawUser,
    #[serde(default)]
    retweeted_status: Option<Box<RawStatus>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntities {
    #[serde(default)]
    hashtags: Vec<RawHashtag>,
    #[serde(default)]
    urls: Vec<RawUrl>,
}

#[derive(Debug, Deserialize)]
struct RawHashtag {
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawUrl {
    #[serde(default)]
    expanded_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    id_str: String,
    #[serde(default)]
    screen_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    profile_image_url_https: Option<String>,
}

/// `search/tweets.json` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSearchResponse {
    #[serde(default)]
    pub statuses: Vec<RawStatus>,
}

/// v1.1 timestamps look like `Wed Oct 10 20:19:24 +0000 2018`.
const V1_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

pub(crate) fn parse_v1_timestamp(value: &str) -> Result<DateTime<Utc>, SourceError> {
    DateTime::parse_from_str(value, V1_TIMESTAMP_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SourceError::MalformedResponse(format!("created_at '{}': {}", value, e)))
}

impl TryFrom<RawStatus> for Post {
    type Error = SourceError;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        let id = raw
            .id_str
            .parse::<PostId>()
            .map_err(|e| SourceError::MalformedResponse(format!("id '{}': {}", raw.id_str, e)))?;
        let created_at = parse_v1_timestamp(&raw.created_at)?;
        // Only one level of wrapping is kept.
        let reposted = match raw.retweeted_status {
            Some(inner) => {
                let mut original = Post::try_from(*inner)?;
                original.reposted = None;
                Some(Box::new(original))
            }
            None => None,
        };

        Ok(Post {
            id,
            created_at,
            text: raw.full_text.or(raw.text).unwrap_or_default(),
            hashtags: raw.entities.hashtags.into_iter().map(|h| h.text).collect(),
            urls: raw
                .entities
                .urls
                .into_iter()
                .filter_map(|u| u.expanded_url)
                .collect(),
            author_id: raw.user.id_str,
            author_screen_name: raw.user.screen_name,
            reposted,
        })
    }
}

impl From<RawUser> for UserProfile {
    fn from(raw: RawUser) -> Self {
        UserProfile {
            id: raw.id_str,
            screen_name: raw.screen_name,
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            avatar_url: raw.profile_image_url_https.unwrap_or_default(),
        }
    }
}
